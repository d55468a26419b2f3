use serde::{Deserialize, Serialize};

/// The two transform sets a user can request for an uploaded portrait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransformMode {
    Ethnicity,
    Creative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transform {
    pub label: &'static str,
    pub description: &'static str,
}

const ETHNICITY: &[Transform] = &[
    Transform {
        label: "East Asian",
        description: "East Asian heritage, such as Chinese, Japanese or Korean",
    },
    Transform {
        label: "South Asian",
        description: "South Asian heritage, such as Indian, Pakistani or Bangladeshi",
    },
    Transform {
        label: "African",
        description: "Sub-Saharan African heritage",
    },
    Transform {
        label: "European",
        description: "Northern or Southern European heritage",
    },
    Transform {
        label: "Middle Eastern",
        description: "Middle Eastern or North African heritage",
    },
    Transform {
        label: "Latino",
        description: "Latin American heritage",
    },
];

const CREATIVE: &[Transform] = &[
    Transform {
        label: "Anime",
        description: "a hand-drawn Japanese anime still with clean line art and cel shading",
    },
    Transform {
        label: "Oil Painting",
        description: "a classical oil painting on canvas with visible brush strokes",
    },
    Transform {
        label: "Pixel Art",
        description: "16-bit pixel art with a limited retro palette",
    },
    Transform {
        label: "Cyberpunk",
        description: "a neon-lit cyberpunk scene with rain and holographic signs",
    },
    Transform {
        label: "Renaissance",
        description: "a Renaissance portrait in the manner of the Italian masters",
    },
    Transform {
        label: "Claymation",
        description: "a stop-motion claymation figure with sculpted plasticine texture",
    },
];

impl TransformMode {
    pub const ALL: [TransformMode; 2] = [TransformMode::Ethnicity, TransformMode::Creative];

    pub fn transforms(self) -> &'static [Transform] {
        match self {
            TransformMode::Ethnicity => ETHNICITY,
            TransformMode::Creative => CREATIVE,
        }
    }

    pub fn labels(self) -> Vec<String> {
        self.transforms()
            .iter()
            .map(|t| t.label.to_string())
            .collect()
    }

    pub fn find(self, label: &str) -> Option<&'static Transform> {
        self.transforms().iter().find(|t| t.label == label)
    }

    pub fn title(self) -> &'static str {
        match self {
            TransformMode::Ethnicity => "Heritage",
            TransformMode::Creative => "Creative Styles",
        }
    }

    pub fn album_subtitle(self) -> &'static str {
        match self {
            TransformMode::Ethnicity => "One face, many heritages",
            TransformMode::Creative => "One face, many styles",
        }
    }

    /// Instruction text sent to the image model alongside the source photo.
    pub fn prompt(self, description: &str) -> String {
        match self {
            TransformMode::Ethnicity => format!(
                "Reimagine the person in this photo as someone of {description}. \
                 Keep their pose, expression, hairstyle, clothing, framing and background. \
                 The result must be a photorealistic portrait photograph."
            ),
            TransformMode::Creative => format!(
                "Redraw the person in this photo as {description}. \
                 Keep their pose, expression and framing so they remain recognizable. \
                 Return only the image."
            ),
        }
    }
}

impl std::fmt::Display for TransformMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_labels_are_unique_per_mode() {
        for mode in TransformMode::ALL {
            let labels: HashSet<_> = mode.transforms().iter().map(|t| t.label).collect();
            assert_eq!(labels.len(), mode.transforms().len(), "{mode}");
            assert_eq!(mode.labels().len(), 6);
        }
    }

    #[test]
    fn test_prompt_carries_description() {
        let anime = TransformMode::Creative.find("Anime").unwrap();
        let prompt = TransformMode::Creative.prompt(anime.description);
        assert!(prompt.contains("cel shading"));

        let prompt = TransformMode::Ethnicity.prompt("Latin American heritage");
        assert!(prompt.contains("Latin American heritage"));
        assert!(prompt.contains("photorealistic"));
    }

    #[test]
    fn test_find_unknown_label() {
        assert!(TransformMode::Ethnicity.find("Anime").is_none());
    }
}
