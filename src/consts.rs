//! Static configuration: endpoints, placeholders, limits.
//! All strings are &'static str to avoid lifetime complexity.

use std::fmt;

/// Two-letter language codes understood by the translation endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lang {
    Pt,
    En,
}

impl Lang {
    #[inline]
    pub const fn code(self) -> &'static str {
        match self {
            Lang::Pt => "pt",
            Lang::En => "en",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Recipe API paths (relative to the configured base URL)
pub mod endpoints {
    pub const DEFAULT_SPOONACULAR_URL: &str = "https://api.spoonacular.com";
    pub const DEFAULT_TRANSLATE_URL: &str = "https://translate.googleapis.com";

    pub const SEARCH: &str = "/recipes/complexSearch";
    pub const RANDOM: &str = "/recipes/random";
    pub const TRANSLATE: &str = "/translate_a/single";

    pub fn information(id: i64) -> String {
        format!("/recipes/{}/information", id)
    }

    pub fn nutrition(id: i64) -> String {
        format!("/recipes/{}/nutritionWidget.json", id)
    }
}

/// User-facing fallbacks substituted during normalization
pub mod placeholders {
    pub const UNTITLED: &str = "Receita sem título";
    pub const UNKNOWN_INGREDIENT: &str = "Ingrediente desconhecido";
    pub const NO_INGREDIENTS: &str = "Nenhum ingrediente listado";
    pub const NO_INSTRUCTIONS: &str = "Instruções não disponíveis.";
    pub const NO_NUTRITION: &str = "Informação não disponível";
}

/// HTTP headers
pub mod headers {
    pub const USER_AGENT: &str = concat!("chef_virtual/", env!("CARGO_PKG_VERSION"));
}

/// Limits and thresholds
pub mod limits {
    pub const DEFAULT_RESULTS_PER_QUERY: u32 = 3;
    pub const REQUEST_TIMEOUT_SECS: u64 = 15;
    pub const MAX_MESSAGE_LEN: usize = 4000;
    pub const HISTORY_TITLE_LEN: usize = 60;
}
