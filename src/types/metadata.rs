use serde::{Deserialize, Serialize};

/// Closed set of stock categories the analysis service may assign.
///
/// The numeric ids follow the submission portal's category table and
/// are stable; do not reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Animals,
    #[serde(rename = "Buildings and Architecture")]
    BuildingsAndArchitecture,
    Business,
    Drinks,
    #[serde(rename = "The Environment")]
    TheEnvironment,
    #[serde(rename = "States of Mind")]
    StatesOfMind,
    Food,
    #[serde(rename = "Graphic Resources")]
    GraphicResources,
    #[serde(rename = "Hobbies and Leisure")]
    HobbiesAndLeisure,
    Industry,
    Landscapes,
    Lifestyle,
    People,
    #[serde(rename = "Plants and Flowers")]
    PlantsAndFlowers,
    #[serde(rename = "Culture and Religion")]
    CultureAndReligion,
    Science,
    #[serde(rename = "Social Issues")]
    SocialIssues,
    Sports,
    Technology,
    Transport,
    Travel,
}

impl Category {
    pub const ALL: [Category; 21] = [
        Category::Animals,
        Category::BuildingsAndArchitecture,
        Category::Business,
        Category::Drinks,
        Category::TheEnvironment,
        Category::StatesOfMind,
        Category::Food,
        Category::GraphicResources,
        Category::HobbiesAndLeisure,
        Category::Industry,
        Category::Landscapes,
        Category::Lifestyle,
        Category::People,
        Category::PlantsAndFlowers,
        Category::CultureAndReligion,
        Category::Science,
        Category::SocialIssues,
        Category::Sports,
        Category::Technology,
        Category::Transport,
        Category::Travel,
    ];

    /// Canonical display name, as the service is instructed to emit it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Animals => "Animals",
            Category::BuildingsAndArchitecture => "Buildings and Architecture",
            Category::Business => "Business",
            Category::Drinks => "Drinks",
            Category::TheEnvironment => "The Environment",
            Category::StatesOfMind => "States of Mind",
            Category::Food => "Food",
            Category::GraphicResources => "Graphic Resources",
            Category::HobbiesAndLeisure => "Hobbies and Leisure",
            Category::Industry => "Industry",
            Category::Landscapes => "Landscapes",
            Category::Lifestyle => "Lifestyle",
            Category::People => "People",
            Category::PlantsAndFlowers => "Plants and Flowers",
            Category::CultureAndReligion => "Culture and Religion",
            Category::Science => "Science",
            Category::SocialIssues => "Social Issues",
            Category::Sports => "Sports",
            Category::Technology => "Technology",
            Category::Transport => "Transport",
            Category::Travel => "Travel",
        }
    }

    /// 1-based id in the portal's category table.
    pub fn id(&self) -> u8 {
        Self::ALL
            .iter()
            .position(|c| c == self)
            .map(|p| p as u8 + 1)
            .unwrap_or(0)
    }

    pub fn from_id(id: u8) -> Option<Self> {
        if (1..=21).contains(&id) {
            Some(Self::ALL[id as usize - 1])
        } else {
            None
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    /// Lenient parse for the validation boundary: canonical name
    /// (case-insensitive, trimmed) or the numeric id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(id) = s.parse::<u8>() {
            return Self::from_id(id).ok_or_else(|| format!("category id out of range: {}", id));
        }
        Self::ALL
            .iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}

/// Validated metadata for one image.
///
/// Created only by the analysis client's parse-then-validate boundary;
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub category: Category,
    pub display_name: String,
}
