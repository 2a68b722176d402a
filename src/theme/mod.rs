//! Presentation themes
//!
//! Both themes render the same routes from the same view data; a theme only
//! decides which CSS classes end up on the generated markup.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Available presentation themes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Gradient blue/indigo look
    #[default]
    Aurora,
    /// Flat, print-like look
    Paper,
}

impl Theme {
    /// All known themes
    pub const ALL: [Theme; 2] = [Theme::Aurora, Theme::Paper];

    /// Theme name as used in config and query strings
    pub fn name(&self) -> &'static str {
        match self {
            Theme::Aurora => "aurora",
            Theme::Paper => "paper",
        }
    }

    /// CSS classes for this theme
    pub fn classes(&self) -> ThemeClasses {
        match self {
            Theme::Aurora => ThemeClasses {
                body: "min-h-screen bg-gradient-to-br from-white via-blue-50 to-indigo-100/30",
                header: "bg-white/90 backdrop-blur-md border-b border-gray-100 sticky top-0 z-50 shadow-sm",
                brand: "text-xl font-bold bg-gradient-to-r from-gray-900 to-blue-800 bg-clip-text text-transparent",
                badge: "bg-gradient-to-r from-blue-600 to-indigo-600 text-white text-sm px-4 py-2 rounded-full font-medium",
                card: "group bg-white rounded-2xl overflow-hidden shadow-lg hover:shadow-2xl transition-all duration-500 border border-gray-100",
                category_active: "px-6 py-3 rounded-xl text-sm font-semibold bg-gradient-to-r from-blue-600 to-indigo-600 text-white shadow-lg",
                category: "px-6 py-3 rounded-xl text-sm font-semibold bg-white text-gray-700 border border-gray-200 hover:border-blue-300 hover:text-blue-600",
                button: "inline-block bg-blue-600 text-white px-6 py-3 rounded-lg hover:bg-blue-700 transition-colors",
                footer: "bg-gradient-to-br from-gray-900 to-blue-900 text-white mt-20",
                h1: "text-3xl md:text-4xl font-bold text-gray-900 mt-8 mb-4",
                h2: "text-2xl md:text-3xl font-bold text-gray-900 mt-8 mb-4",
                h3: "text-xl md:text-2xl font-semibold text-gray-900 mt-6 mb-3",
                paragraph: "text-gray-700 text-lg leading-relaxed mb-6",
                blockquote: "border-l-4 border-blue-500 pl-6 italic text-gray-600 text-xl my-8 bg-blue-50 py-4 rounded-r-lg",
                bullet_list: "list-disc list-inside space-y-2 mb-6 text-gray-700 text-lg",
                number_list: "list-decimal list-inside space-y-2 mb-6 text-gray-700 text-lg",
                list_item: "ml-4",
                strong: "font-bold text-gray-900",
                em: "italic text-gray-800",
                link: "text-blue-600 hover:text-blue-800 underline transition-colors",
            },
            Theme::Paper => ThemeClasses {
                body: "min-h-screen bg-stone-50 text-stone-900 font-serif",
                header: "bg-stone-50 border-b-2 border-stone-900",
                brand: "text-2xl font-black tracking-tight text-stone-900",
                badge: "uppercase tracking-widest text-xs text-red-700 font-semibold",
                card: "group block border-t border-stone-300 pt-6",
                category_active: "px-3 py-1 text-sm uppercase tracking-wide border-b-2 border-red-700 text-stone-900",
                category: "px-3 py-1 text-sm uppercase tracking-wide text-stone-600 hover:text-red-700",
                button: "inline-block border border-stone-900 px-6 py-3 hover:bg-stone-900 hover:text-stone-50",
                footer: "border-t-2 border-stone-900 mt-20 text-stone-700",
                h1: "text-4xl font-black mt-10 mb-4",
                h2: "text-3xl font-bold mt-8 mb-4",
                h3: "text-2xl font-semibold mt-6 mb-3",
                paragraph: "text-lg leading-8 mb-6",
                blockquote: "border-l-2 border-red-700 pl-6 text-2xl italic my-10",
                bullet_list: "list-disc pl-6 space-y-2 mb-6 text-lg",
                number_list: "list-decimal pl-6 space-y-2 mb-6 text-lg",
                list_item: "pl-1",
                strong: "font-bold",
                em: "italic",
                link: "text-red-700 underline underline-offset-4",
            },
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::ALL
            .into_iter()
            .find(|theme| theme.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("Unknown theme: {}. Available: aurora, paper", s))
    }
}

/// CSS classes a theme assigns to each structural element
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ThemeClasses {
    pub body: &'static str,
    pub header: &'static str,
    pub brand: &'static str,
    pub badge: &'static str,
    pub card: &'static str,
    pub category_active: &'static str,
    pub category: &'static str,
    pub button: &'static str,
    pub footer: &'static str,
    pub h1: &'static str,
    pub h2: &'static str,
    pub h3: &'static str,
    pub paragraph: &'static str,
    pub blockquote: &'static str,
    pub bullet_list: &'static str,
    pub number_list: &'static str,
    pub list_item: &'static str,
    pub strong: &'static str,
    pub em: &'static str,
    pub link: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_theme() {
        assert_eq!("aurora".parse::<Theme>().unwrap(), Theme::Aurora);
        assert_eq!(" Paper ".parse::<Theme>().unwrap(), Theme::Paper);
        assert!("neon".parse::<Theme>().is_err());
    }

    #[test]
    fn test_themes_differ_only_in_classes() {
        let aurora = Theme::Aurora.classes();
        let paper = Theme::Paper.classes();
        assert_ne!(aurora.paragraph, paper.paragraph);
        assert_ne!(aurora.link, paper.link);
    }
}
