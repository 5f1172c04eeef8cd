use serde::{Deserialize, Serialize};

/// The fixed disposition taxonomy. Every call record shown in the client
/// views carries exactly one of these twelve values after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Qualified")]
    Qualified,
    #[serde(rename = "Neutral")]
    Neutral,
    #[serde(rename = "Unclear Response")]
    UnclearResponse,
    #[serde(rename = "Inaudible")]
    Inaudible,
    #[serde(rename = "Answering Machine")]
    AnsweringMachine,
    #[serde(rename = "DAIR")]
    Dair,
    #[serde(rename = "Honeypot")]
    Honeypot,
    #[serde(rename = "DNC")]
    Dnc,
    #[serde(rename = "Do Not Qualify")]
    DoNotQualify,
    #[serde(rename = "Not Interested")]
    NotInterested,
    #[serde(rename = "User Silent")]
    UserSilent,
    #[serde(rename = "User Hang Up")]
    UserHangUp,
}

/// Which of the two summary-chart buckets a category falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Engaged,
    DropOff,
}

impl Category {
    /// All taxonomy values, in display order.
    pub const ALL: [Category; 12] = [
        Category::Qualified,
        Category::Neutral,
        Category::UnclearResponse,
        Category::Inaudible,
        Category::AnsweringMachine,
        Category::Dair,
        Category::Honeypot,
        Category::Dnc,
        Category::DoNotQualify,
        Category::NotInterested,
        Category::UserSilent,
        Category::UserHangUp,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Qualified => "Qualified",
            Category::Neutral => "Neutral",
            Category::UnclearResponse => "Unclear Response",
            Category::Inaudible => "Inaudible",
            Category::AnsweringMachine => "Answering Machine",
            Category::Dair => "DAIR",
            Category::Honeypot => "Honeypot",
            Category::Dnc => "DNC",
            Category::DoNotQualify => "Do Not Qualify",
            Category::NotInterested => "Not Interested",
            Category::UserSilent => "User Silent",
            Category::UserHangUp => "User Hang Up",
        }
    }

    /// Exact taxonomy membership check (case-sensitive, no synonyms).
    pub fn from_label(label: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.label() == label)
    }

    /// Map a raw API category into the taxonomy. Synonyms are substituted
    /// first (exact, case-sensitive match); anything that still isn't a
    /// taxonomy member falls back to "User Hang Up". Total: never fails,
    /// never returns a value outside the taxonomy.
    pub fn normalize(raw: Option<&str>) -> Category {
        let raw = match raw {
            Some(r) => r,
            None => return Category::UserHangUp,
        };
        let mapped = match raw {
            "Unknown" => "Unclear Response",
            "Rebuttal" | "Busy" | "Already Customer" | "Repeat Pitch" => "Not Interested",
            "DNQ" | "Do not qualify" => "Do Not Qualify",
            other => other,
        };
        Category::from_label(mapped).unwrap_or(Category::UserHangUp)
    }

    /// Summary-chart partition: engaged outcomes vs drop-offs.
    pub fn bucket(&self) -> Bucket {
        match self {
            Category::Qualified
            | Category::Neutral
            | Category::UnclearResponse
            | Category::Inaudible => Bucket::Engaged,
            _ => Bucket::DropOff,
        }
    }

    /// Fallback display color, used when the API doesn't supply one.
    pub fn default_color(&self) -> &'static str {
        match self {
            Category::Qualified => "#66bb6a",
            Category::Neutral => "#9e9e9e",
            Category::UnclearResponse => "#f06292",
            Category::Inaudible => "#ef5350",
            Category::AnsweringMachine => "#26c6da",
            Category::Dair => "#42a5f5",
            Category::Honeypot => "#ffa726",
            Category::Dnc => "#ffca28",
            Category::DoNotQualify => "#ffca28",
            Category::NotInterested => "#ef5350",
            Category::UserSilent => "#ab47bc",
            Category::UserHangUp => "#ef5350",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    /// Strict parse for CLI filter arguments: taxonomy labels and known
    /// synonyms are accepted, anything else is an error (unlike
    /// `normalize`, which coerces).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unknown" | "Rebuttal" | "Busy" | "Already Customer" | "Repeat Pitch" | "DNQ"
            | "Do not qualify" => Ok(Category::normalize(Some(s))),
            _ => Category::from_label(s)
                .ok_or_else(|| format!("unknown category: {s}. Use one of the 12 taxonomy labels")),
        }
    }
}
