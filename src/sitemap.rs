//! # Sitemaps
//!
//! Builds the site's sitemap set from the tool catalog (one sitemap per
//! category, one for the static pages, and a `sitemap.xml` index), and splits
//! an existing single-file sitemap into the same layout by matching URL paths
//! against per-category patterns.

use std::fmt::Display;
use std::sync::OnceLock;

use chrono::NaiveDate;
use log::info;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::catalog::{Category, Tool, group_by_category};
use crate::schema::ToolError;

pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
pub const INDEX_FILE: &str = "sitemap.xml";

const DEFAULT_BASE_URL: &str = "https://dapsiwow.com";
const DEFAULT_CHANGEFREQ: &str = "weekly";
const DEFAULT_PRIORITY: &str = "0.8";

/// Static pages listed in `sitemap-main.xml`: path, changefreq, priority.
const MAIN_PAGES: &[(&str, &str, &str)] = &[
    ("/", "daily", "1.0"),
    ("/about-us", "monthly", "0.8"),
    ("/contact-us", "monthly", "0.8"),
    ("/privacy-policy", "yearly", "0.5"),
    ("/terms-of-service", "yearly", "0.5"),
    ("/help-center", "monthly", "0.7"),
    ("/all-tools", "weekly", "0.9"),
    ("/finance-tools", "weekly", "0.9"),
    ("/health-tools", "weekly", "0.9"),
    ("/text-tools", "weekly", "0.9"),
];

/// Sitemap generation settings.
///
/// # Examples
///
/// ```json
/// { "base_url": "https://staging.dapsiwow.com", "lastmod": "2025-06-01" }
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SiteConfig {
    /// Site origin. Defaults to `https://dapsiwow.com`.
    pub base_url: Option<String>,
    /// `<lastmod>` date. Defaults to today.
    pub lastmod: Option<NaiveDate>,
    /// `<changefreq>` of tool pages. Defaults to `weekly`.
    pub changefreq: Option<String>,
    /// `<priority>` of tool pages. Defaults to `0.8`.
    pub priority: Option<String>,
}

impl SiteConfig {
    pub fn from_json(config_json: Option<&str>) -> Self {
        match config_json {
            Some(s) => serde_json::from_str(s).unwrap_or_default(),
            None => SiteConfig::default(),
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn lastmod(&self) -> String {
        self.lastmod
            .unwrap_or_else(|| chrono::Utc::now().date_naive())
            .format("%Y-%m-%d")
            .to_string()
    }

    fn changefreq(&self) -> &str {
        self.changefreq.as_deref().unwrap_or(DEFAULT_CHANGEFREQ)
    }

    fn priority(&self) -> &str {
        self.priority.as_deref().unwrap_or(DEFAULT_PRIORITY)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: String,
    pub changefreq: String,
    pub priority: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SitemapFile {
    pub filename: String,
    pub xml: String,
    pub url_count: usize,
}

/// Sitemap a URL belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    Main,
    Tools(Category),
}

impl Section {
    pub fn filename(self) -> String {
        match self {
            Section::Main => "sitemap-main.xml".into(),
            Section::Tools(category) => format!("sitemap-{}.xml", category.as_str()),
        }
    }
}

fn xml_err<E: Display>(err: E) -> ToolError {
    ToolError::Xml(err.to_string())
}

fn new_writer() -> Result<Writer<Vec<u8>>, ToolError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_err)?;
    Ok(writer)
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    text: &str,
) -> Result<(), ToolError> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(xml_err)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_err)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_err)
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String, ToolError> {
    String::from_utf8(writer.into_inner()).map_err(xml_err)
}

/// Serialises a `<urlset>` document.
pub fn write_urlset(entries: &[SitemapEntry]) -> Result<String, ToolError> {
    let mut writer = new_writer()?;
    let mut root = BytesStart::new("urlset");
    root.push_attribute(("xmlns", SITEMAP_NS));
    writer.write_event(Event::Start(root)).map_err(xml_err)?;

    for entry in entries {
        writer
            .write_event(Event::Start(BytesStart::new("url")))
            .map_err(xml_err)?;
        write_text_element(&mut writer, "loc", &entry.loc)?;
        write_text_element(&mut writer, "lastmod", &entry.lastmod)?;
        write_text_element(&mut writer, "changefreq", &entry.changefreq)?;
        write_text_element(&mut writer, "priority", &entry.priority)?;
        writer
            .write_event(Event::End(BytesEnd::new("url")))
            .map_err(xml_err)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("urlset")))
        .map_err(xml_err)?;
    finish(writer)
}

/// Serialises a `<sitemapindex>` document pointing at `locs`.
pub fn write_index(locs: &[String], lastmod: &str) -> Result<String, ToolError> {
    let mut writer = new_writer()?;
    let mut root = BytesStart::new("sitemapindex");
    root.push_attribute(("xmlns", SITEMAP_NS));
    writer.write_event(Event::Start(root)).map_err(xml_err)?;

    for loc in locs {
        writer
            .write_event(Event::Start(BytesStart::new("sitemap")))
            .map_err(xml_err)?;
        write_text_element(&mut writer, "loc", loc)?;
        write_text_element(&mut writer, "lastmod", lastmod)?;
        writer
            .write_event(Event::End(BytesEnd::new("sitemap")))
            .map_err(xml_err)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("sitemapindex")))
        .map_err(xml_err)?;
    finish(writer)
}

fn urlset_file(filename: String, entries: &[SitemapEntry]) -> Result<SitemapFile, ToolError> {
    Ok(SitemapFile {
        filename,
        xml: write_urlset(entries)?,
        url_count: entries.len(),
    })
}

fn main_entries(config: &SiteConfig, lastmod: &str) -> Vec<SitemapEntry> {
    MAIN_PAGES
        .iter()
        .map(|(path, changefreq, priority)| SitemapEntry {
            loc: format!("{}{}", config.base_url(), path),
            lastmod: lastmod.to_string(),
            changefreq: (*changefreq).into(),
            priority: (*priority).into(),
        })
        .collect()
}

/// Category sitemaps, `sitemap-main.xml` and the `sitemap.xml` index, in that order.
pub fn generate_sitemaps(
    tools: &[Tool],
    config: &SiteConfig,
) -> Result<Vec<SitemapFile>, ToolError> {
    if tools.is_empty() {
        return Err(ToolError::InvalidInput("no tools to include in the sitemap".into()));
    }
    let lastmod = config.lastmod();
    let mut files = Vec::new();
    let mut index_locs = vec![format!("{}/{}", config.base_url(), Section::Main.filename())];

    for (category, group) in group_by_category(tools) {
        let entries: Vec<SitemapEntry> = group
            .iter()
            .map(|tool| SitemapEntry {
                loc: tool.url(config.base_url()),
                lastmod: lastmod.clone(),
                changefreq: config.changefreq().into(),
                priority: config.priority().into(),
            })
            .collect();
        let filename = Section::Tools(category).filename();
        index_locs.push(format!("{}/{}", config.base_url(), filename));
        files.push(urlset_file(filename, &entries)?);
    }

    files.push(urlset_file(
        Section::Main.filename(),
        &main_entries(config, &lastmod),
    )?);
    files.push(SitemapFile {
        filename: INDEX_FILE.into(),
        xml: write_index(&index_locs, &lastmod)?,
        url_count: index_locs.len(),
    });

    info!("generated {} sitemap files for {} tools", files.len(), tools.len());
    Ok(files)
}

#[derive(Clone, Copy)]
enum UrlField {
    Loc,
    Lastmod,
    Changefreq,
    Priority,
}

/// Reads the `<url>` entries of a `<urlset>` document. Missing optional
/// elements take the defaults from `config`; entries without `<loc>` are skipped.
pub fn parse_sitemap(xml: &str, config: &SiteConfig) -> Result<Vec<SitemapEntry>, ToolError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<[Option<String>; 4]> = None;
    let mut field: Option<UrlField> = None;

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => {
                let local = e.local_name();
                field = match local.as_ref() {
                    b"url" => {
                        current = Some(Default::default());
                        None
                    }
                    b"loc" => Some(UrlField::Loc),
                    b"lastmod" => Some(UrlField::Lastmod),
                    b"changefreq" => Some(UrlField::Changefreq),
                    b"priority" => Some(UrlField::Priority),
                    _ => None,
                };
            }
            Event::Text(t) => {
                if let (Some(values), Some(f)) = (current.as_mut(), field) {
                    values[f as usize] = Some(t.unescape().map_err(xml_err)?.trim().to_string());
                }
            }
            Event::End(e) => {
                if e.local_name().as_ref() == b"url" {
                    if let Some([loc, lastmod, changefreq, priority]) = current.take() {
                        if let Some(loc) = loc.filter(|l| !l.is_empty()) {
                            entries.push(SitemapEntry {
                                loc,
                                lastmod: lastmod.unwrap_or_else(|| config.lastmod()),
                                changefreq: changefreq
                                    .unwrap_or_else(|| DEFAULT_CHANGEFREQ.into()),
                                priority: priority.unwrap_or_else(|| DEFAULT_PRIORITY.into()),
                            });
                        }
                    }
                }
                field = None;
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(entries)
}

struct SectionRules {
    section: Section,
    patterns: Vec<Regex>,
}

fn compile(section: Section, patterns: &[&str]) -> SectionRules {
    SectionRules {
        section,
        patterns: patterns
            .iter()
            .filter_map(|p| Regex::new(&format!("(?i){p}")).ok())
            .collect(),
    }
}

/// Tool-category rules in match order.
fn rules() -> &'static [SectionRules] {
    static RULES: OnceLock<Vec<SectionRules>> = OnceLock::new();
    RULES.get_or_init(|| {
        vec![
            compile(
                Section::Tools(Category::Finance),
                &[
                    r"loan.*calculator",
                    r"mortgage.*calculator",
                    r"emi.*calculator",
                    r"compound.*interest",
                    r"simple.*interest",
                    r"roi.*calculator",
                    r"tax.*calculator",
                    r"salary.*calculator",
                    r"tip.*calculator",
                    r"inflation.*calculator",
                    r"savings.*calculator",
                    r"debt.*calculator",
                    r"investment.*calculator",
                    r"retirement.*calculator",
                    r"sip.*calculator",
                    r"break.*even",
                    r"business.*loan",
                    r"car.*loan",
                    r"home.*loan",
                    r"education.*loan",
                    r"credit.*card",
                    r"percentage.*calculator",
                    r"discount.*calculator",
                    r"vat.*calculator",
                    r"gst.*calculator",
                    r"paypal.*fee",
                    r"lease.*calculator",
                    r"stock.*profit",
                    r"net.*worth",
                ],
            ),
            compile(
                Section::Tools(Category::Health),
                &[
                    r"bmi.*calculator",
                    r"bmr.*calculator",
                    r"calorie.*calculator",
                    r"body.*fat",
                    r"ideal.*weight",
                    r"pregnancy.*calculator",
                    r"water.*intake",
                    r"protein.*calculator",
                    r"carb.*calculator",
                    r"keto.*calculator",
                    r"fasting.*timer",
                    r"step.*calorie",
                    r"heart.*rate",
                    r"blood.*pressure",
                    r"sleep.*calculator",
                    r"ovulation.*calculator",
                    r"baby.*growth",
                    r"tdee.*calculator",
                    r"lean.*body",
                    r"waist.*ratio",
                    r"whr.*calculator",
                    r"life.*expectancy",
                    r"cholesterol.*calculator",
                    r"running.*pace",
                    r"cycling.*speed",
                    r"swimming.*calorie",
                    r"alcohol.*calorie",
                    r"smoking.*cost",
                ],
            ),
            compile(
                Section::Tools(Category::Pdf),
                &[
                    r"merge.*pdf",
                    r"split.*pdf",
                    r"compress.*pdf",
                    r"pdf.*compress",
                    r"pdf.*merge",
                    r"pdf.*split",
                    r"pdf.*convert",
                    r"convert.*pdf",
                    r"pdf.*to.*image",
                    r"image.*to.*pdf",
                    r"pdf.*to.*word",
                    r"word.*to.*pdf",
                    r"pdf.*to.*excel",
                    r"excel.*to.*pdf",
                    r"pdf.*encrypt",
                    r"encrypt.*pdf",
                    r"pdf.*decrypt",
                    r"decrypt.*pdf",
                    r"pdf.*rotate",
                    r"rotate.*pdf",
                    r"pdf.*watermark",
                    r"watermark.*pdf",
                    r"pdf.*sign",
                    r"sign.*pdf",
                    r"pdf.*edit",
                    r"edit.*pdf",
                    r"pdf.*form",
                ],
            ),
            compile(
                Section::Tools(Category::Text),
                &[
                    r"word.*counter",
                    r"character.*counter",
                    r"sentence.*counter",
                    r"paragraph.*counter",
                    r"case.*converter",
                    r"password.*generator",
                    r"name.*generator",
                    r"username.*generator",
                    r"address.*generator",
                    r"qr.*generator",
                    r"font.*changer",
                    r"reverse.*text",
                    r"upside.*down",
                    r"text.*to.*qr",
                    r"qr.*to.*text",
                    r"text.*to.*binary",
                    r"binary.*to.*text",
                    r"qr.*scanner",
                    r"markdown.*to.*html",
                    r"html.*to.*markdown",
                    r"lorem.*ipsum",
                    r"text.*encrypt",
                    r"text.*decrypt",
                    r"url.*encoder",
                    r"url.*decoder",
                    r"base64.*encode",
                    r"base64.*decode",
                ],
            ),
        ]
    })
}

/// Sitemap section for `url`. Tool categories are tried first; anything
/// unmatched lands in the main sitemap.
pub fn categorize_url(url: &str, base_url: &str) -> Section {
    let path = url.replace(base_url.trim_end_matches('/'), "").to_lowercase();
    rules()
        .iter()
        .find(|rules| rules.patterns.iter().any(|re| re.is_match(&path)))
        .map(|rules| rules.section)
        .unwrap_or(Section::Main)
}

/// Splits one large sitemap into per-section sitemaps plus an index.
///
/// Only sections that receive at least one URL get a file, and the index
/// references exactly those files.
pub fn split_sitemap(xml: &str, config: &SiteConfig) -> Result<Vec<SitemapFile>, ToolError> {
    let entries = parse_sitemap(xml, config)?;
    if entries.is_empty() {
        return Err(ToolError::InvalidInput("sitemap contains no URLs".into()));
    }

    let order = [
        Section::Main,
        Section::Tools(Category::Finance),
        Section::Tools(Category::Health),
        Section::Tools(Category::Pdf),
        Section::Tools(Category::Text),
    ];
    let mut buckets: Vec<Vec<SitemapEntry>> = vec![Vec::new(); order.len()];
    for entry in entries {
        let section = categorize_url(&entry.loc, config.base_url());
        if let Some(idx) = order.iter().position(|s| *s == section) {
            buckets[idx].push(entry);
        }
    }

    let mut files = Vec::new();
    let mut index_locs = Vec::new();
    for (section, bucket) in order.iter().zip(buckets.iter()) {
        if bucket.is_empty() {
            continue;
        }
        let filename = section.filename();
        index_locs.push(format!("{}/{}", config.base_url(), filename));
        files.push(urlset_file(filename, bucket)?);
    }
    files.push(SitemapFile {
        filename: INDEX_FILE.into(),
        xml: write_index(&index_locs, &config.lastmod())?,
        url_count: index_locs.len(),
    });

    info!("split sitemap into {} files", files.len());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin_tools;

    fn config() -> SiteConfig {
        SiteConfig {
            base_url: Some("https://dapsiwow.com/".into()),
            lastmod: NaiveDate::from_ymd_opt(2025, 6, 1),
            changefreq: None,
            priority: None,
        }
    }

    #[test]
    fn generates_category_main_and_index_files() {
        let files = generate_sitemaps(&builtin_tools(), &config()).unwrap();
        let names: Vec<_> = files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "sitemap-health.xml",
                "sitemap-pdf.xml",
                "sitemap-text.xml",
                "sitemap-main.xml",
                "sitemap.xml"
            ]
        );

        let health = &files[0];
        assert!(health.xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(health.xml.contains(SITEMAP_NS));
        assert!(health.xml.contains("<loc>https://dapsiwow.com/tools/bmi-calculator</loc>"));
        assert!(health.xml.contains("<lastmod>2025-06-01</lastmod>"));
        assert!(health.xml.contains("<changefreq>weekly</changefreq>"));

        let main = &files[3];
        assert_eq!(main.url_count, MAIN_PAGES.len());
        assert!(main.xml.contains("<loc>https://dapsiwow.com/</loc>"));

        let index = &files[4];
        let main_pos = index.xml.find("sitemap-main.xml").unwrap();
        let health_pos = index.xml.find("sitemap-health.xml").unwrap();
        let text_pos = index.xml.find("sitemap-text.xml").unwrap();
        assert!(main_pos < health_pos && health_pos < text_pos);
        assert_eq!(index.url_count, 4);
    }

    #[test]
    fn empty_tool_list_is_rejected() {
        assert!(generate_sitemaps(&[], &config()).is_err());
    }

    #[test]
    fn parse_reads_generated_output_back() {
        let files = generate_sitemaps(&builtin_tools(), &config()).unwrap();
        let text = files.iter().find(|f| f.filename == "sitemap-text.xml").unwrap();
        let entries = parse_sitemap(&text.xml, &config()).unwrap();
        assert_eq!(entries.len(), text.url_count);
        assert!(entries.iter().all(|e| e.priority == "0.8"));
    }

    #[test]
    fn parse_fills_defaults_and_skips_missing_loc() {
        let xml = r#"<?xml version="1.0"?>
            <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
              <url><loc>https://dapsiwow.com/tools/a?x=1&amp;y=2</loc></url>
              <url><lastmod>2020-01-01</lastmod></url>
            </urlset>"#;
        let entries = parse_sitemap(xml, &config()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].loc, "https://dapsiwow.com/tools/a?x=1&y=2");
        assert_eq!(entries[0].lastmod, "2025-06-01");
        assert_eq!(entries[0].changefreq, "weekly");
    }

    #[test]
    fn categorize_matches_patterns_in_order() {
        let base = "https://dapsiwow.com";
        let cases = [
            ("https://dapsiwow.com/tools/loan-calculator", Section::Tools(Category::Finance)),
            ("https://dapsiwow.com/tools/BMR-Calculator", Section::Tools(Category::Health)),
            ("https://dapsiwow.com/tools/merge-pdf", Section::Tools(Category::Pdf)),
            ("https://dapsiwow.com/tools/text-to-binary-converter", Section::Tools(Category::Text)),
            ("https://dapsiwow.com/", Section::Main),
            ("https://dapsiwow.com/tools/something-else", Section::Main),
        ];
        for (url, expected) in cases {
            assert_eq!(categorize_url(url, base), expected, "{url}");
        }
    }

    #[test]
    fn split_only_indexes_emitted_sections() {
        let xml = r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
              <url><loc>https://dapsiwow.com/</loc><priority>1.0</priority></url>
              <url><loc>https://dapsiwow.com/tools/bmi-calculator</loc></url>
              <url><loc>https://dapsiwow.com/tools/body-fat-calculator</loc></url>
            </urlset>"#;
        let files = split_sitemap(xml, &config()).unwrap();
        let names: Vec<_> = files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, vec!["sitemap-main.xml", "sitemap-health.xml", "sitemap.xml"]);
        assert_eq!(files[1].url_count, 2);
        assert!(files[0].xml.contains("<priority>1.0</priority>"));
        assert!(!files[2].xml.contains("sitemap-finance.xml"));
    }

    #[test]
    fn split_rejects_empty_sitemap() {
        let xml = r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"></urlset>"#;
        assert!(matches!(split_sitemap(xml, &config()), Err(ToolError::InvalidInput(_))));
    }
}
