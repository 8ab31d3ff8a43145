//! Registry of the tool pages this library powers.
//!
//! The catalog feeds the "all tools" listing and the sitemap generator, and
//! every id in it is accepted by [`crate::assembly::run_tool_json`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Site section a tool is listed under. Variants are in alphabetical order so
/// grouped output is sorted by category name.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Finance,
    Health,
    Pdf,
    Text,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Finance => "finance",
            Category::Health => "health",
            Category::Pdf => "pdf",
            Category::Text => "text",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Tool {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub href: String,
}

impl Tool {
    /// Absolute URL of the tool page under `base_url`.
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}{}",
            base_url.trim_end_matches('/'),
            normalize_href(&self.id, &self.href)
        )
    }
}

const BUILTIN: &[(&str, &str, &str, Category)] = &[
    (
        "baby-growth-percentile-calculator",
        "Baby Growth Percentile Calculator",
        "Compare weight, length and head circumference with WHO growth standards.",
        Category::Health,
    ),
    (
        "body-fat-calculator",
        "Body Fat Calculator",
        "Estimate body fat percentage with the US Navy method.",
        Category::Health,
    ),
    (
        "bmr-calculator",
        "BMR Calculator",
        "Calculate your basal metabolic rate.",
        Category::Health,
    ),
    (
        "tdee-calculator",
        "TDEE Calculator",
        "Find your total daily energy expenditure and calorie targets.",
        Category::Health,
    ),
    (
        "bmi-calculator",
        "BMI Calculator",
        "Calculate body mass index and healthy weight range.",
        Category::Health,
    ),
    (
        "swimming-calorie-calculator",
        "Swimming Calorie Calculator",
        "Estimate calories burned swimming by stroke and duration.",
        Category::Health,
    ),
    (
        "text-to-binary-converter",
        "Text to Binary Converter",
        "Convert text to binary, decimal, hex or octal codes.",
        Category::Text,
    ),
    (
        "binary-to-text-converter",
        "Binary to Text Converter",
        "Decode binary, decimal, hex or octal codes back to text.",
        Category::Text,
    ),
    (
        "reverse-text-generator",
        "Reverse Text Generator",
        "Reverse text by characters, words or lines.",
        Category::Text,
    ),
    (
        "upside-down-text-generator",
        "Upside Down Text Generator",
        "Flip text upside down.",
        Category::Text,
    ),
    (
        "word-counter",
        "Word Counter",
        "Count words, sentences and paragraphs.",
        Category::Text,
    ),
    (
        "character-counter",
        "Character Counter",
        "Count characters with and without spaces.",
        Category::Text,
    ),
    (
        "pdf-form-field-extractor",
        "PDF Form Field Extractor",
        "List and export the fillable fields of a PDF form.",
        Category::Pdf,
    ),
];

/// Every tool in the catalog, with hrefs under `/tools/`.
pub fn builtin_tools() -> Vec<Tool> {
    BUILTIN
        .iter()
        .map(|(id, name, description, category)| Tool {
            id: (*id).into(),
            name: (*name).into(),
            description: (*description).into(),
            category: *category,
            href: format!("/tools/{id}"),
        })
        .collect()
}

pub fn find_tool(id: &str) -> Option<Tool> {
    builtin_tools().into_iter().find(|t| t.id == id)
}

/// Canonical path of a tool page.
///
/// An href outside `/tools/` is replaced by `/tools/<id>`; the result is
/// lowercased, doubled slashes are collapsed and trailing slashes removed.
pub fn normalize_href(id: &str, href: &str) -> String {
    let href = if href.starts_with("/tools/") {
        href.to_string()
    } else {
        format!("/tools/{id}")
    };
    href.to_lowercase()
        .replace("//", "/")
        .trim_end_matches('/')
        .to_string()
}

/// Groups tools by category, each group sorted by name.
pub fn group_by_category(tools: &[Tool]) -> BTreeMap<Category, Vec<Tool>> {
    let mut groups: BTreeMap<Category, Vec<Tool>> = BTreeMap::new();
    for tool in tools {
        groups.entry(tool.category).or_default().push(tool.clone());
    }
    for group in groups.values_mut() {
        group.sort_by(|a, b| a.name.cmp(&b.name));
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn href_normalization() {
        assert_eq!(normalize_href("bmi", "/tools/BMI-Calculator/"), "/tools/bmi-calculator");
        assert_eq!(normalize_href("bmi", "/calc/bmi"), "/tools/bmi");
        assert_eq!(normalize_href("x", "/tools//x//"), "/tools/x");
    }

    #[test]
    fn groups_are_sorted_by_category_then_name() {
        let groups = group_by_category(&builtin_tools());
        let keys: Vec<_> = groups.keys().copied().collect();
        assert_eq!(keys, vec![Category::Health, Category::Pdf, Category::Text]);
        let health = &groups[&Category::Health];
        // byte order: "BMI" sorts before "Baby"
        assert_eq!(health[0].name, "BMI Calculator");
        assert!(health.windows(2).all(|w| w[0].name <= w[1].name));
    }

    #[test]
    fn ids_are_unique_and_urls_absolute() {
        let tools = builtin_tools();
        let mut ids: Vec<_> = tools.iter().map(|t| t.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), tools.len());
        let bmi = find_tool("bmi-calculator").unwrap();
        assert_eq!(bmi.url("https://dapsiwow.com/"), "https://dapsiwow.com/tools/bmi-calculator");
    }
}
