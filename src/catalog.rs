use crate::schema::{FieldSpec, KeepRule, PresenceRule, Schema};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Kind of page as stored by the content API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageType {
    Simple,
    List,
    Structured,
    Faq,
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PageType::Simple => "SIMPLE",
            PageType::List => "LIST",
            PageType::Structured => "STRUCTURED",
            PageType::Faq => "FAQ",
        };
        f.write_str(name)
    }
}

/// A catalogued page: its slug, stored type and content schema.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub slug: &'static str,
    pub page_type: PageType,
    pub schema: Schema,
}

/// Global page catalog singleton.
pub struct SchemaCatalog {
    entries: Vec<CatalogEntry>,
}

static CATALOG: OnceLock<SchemaCatalog> = OnceLock::new();

impl SchemaCatalog {
    pub fn get() -> &'static SchemaCatalog {
        CATALOG.get_or_init(|| SchemaCatalog {
            entries: default_entries(),
        })
    }

    pub fn entry(&self, slug: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.slug == slug)
    }

    pub fn schema(&self, slug: &str) -> Option<&Schema> {
        self.entry(slug).map(|entry| &entry.schema)
    }

    pub fn slugs(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.slug).collect()
    }
}

fn default_entries() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry {
            slug: "home",
            page_type: PageType::Structured,
            schema: home_schema(),
        },
        CatalogEntry {
            slug: "about",
            page_type: PageType::Simple,
            schema: about_schema(),
        },
        CatalogEntry {
            slug: "programmes",
            page_type: PageType::List,
            schema: programmes_schema(),
        },
        CatalogEntry {
            slug: "careers",
            page_type: PageType::Structured,
            schema: careers_schema(),
        },
        CatalogEntry {
            slug: "schedule",
            page_type: PageType::Structured,
            schema: schedule_schema(),
        },
        CatalogEntry {
            slug: "media",
            page_type: PageType::List,
            schema: media_schema(),
        },
        CatalogEntry {
            slug: "partnerships",
            page_type: PageType::List,
            schema: partnerships_schema(),
        },
        CatalogEntry {
            slug: "faq",
            page_type: PageType::Faq,
            schema: faq_schema(),
        },
    ]
}

fn home_schema() -> Schema {
    Schema::new("home")
        .field(FieldSpec::scalar("heroTitle"))
        .field(FieldSpec::scalar("heroSubtitle"))
        .field(FieldSpec::flat_list("items"))
        .field(FieldSpec::group_list(
            "features",
            vec![
                FieldSpec::scalar("icon").with_default("fa-star").decorative(),
                FieldSpec::scalar("title"),
                FieldSpec::scalar("description"),
            ],
        ))
        .presence(PresenceRule::FieldsOrFirstList(vec!["heroTitle"]))
        .title_fields(&["heroTitle"])
}

fn about_schema() -> Schema {
    Schema::new("about")
        .field(FieldSpec::scalar("title"))
        .field(FieldSpec::scalar("body"))
        .field(FieldSpec::flat_list("values"))
        .presence(PresenceRule::Fields(vec!["title", "body"]))
        .title_fields(&["title"])
}

fn programmes_schema() -> Schema {
    Schema::new("programmes")
        .field(FieldSpec::scalar("heroTitle"))
        .field(FieldSpec::scalar("heroDescription"))
        .field(FieldSpec::group_list(
            "programmes",
            vec![
                FieldSpec::scalar("id"),
                FieldSpec::scalar("title"),
                FieldSpec::scalar("description"),
                FieldSpec::scalar("status").with_default("active").decorative(),
                FieldSpec::group_list(
                    "steps",
                    vec![
                        FieldSpec::sequence("stepNumber"),
                        FieldSpec::scalar("title"),
                        FieldSpec::scalar("description"),
                        FieldSpec::scalar("icon").with_default("fa-check").decorative(),
                    ],
                ),
            ],
        ))
        .presence(PresenceRule::FieldsOrFirstList(vec!["heroTitle"]))
        .title_fields(&["heroTitle"])
}

fn careers_schema() -> Schema {
    Schema::new("careers")
        .field(FieldSpec::scalar("heroTitle"))
        .field(FieldSpec::group_list(
            "levels",
            vec![
                FieldSpec::sequence("levelNumber"),
                FieldSpec::scalar("name"),
                FieldSpec::scalar("color").with_default("#1d4ed8").decorative(),
                FieldSpec::flat_list("positions"),
            ],
        ))
        .presence(PresenceRule::FieldsOrFirstList(vec!["heroTitle"]))
        .title_fields(&["heroTitle"])
}

fn schedule_schema() -> Schema {
    Schema::new("schedule")
        .field(FieldSpec::scalar("heroTitle"))
        .field(FieldSpec::group_list(
            "days",
            vec![
                FieldSpec::scalar("day"),
                FieldSpec::group_list(
                    "sessions",
                    vec![
                        FieldSpec::scalar("time"),
                        FieldSpec::scalar("title"),
                        FieldSpec::scalar("speaker"),
                    ],
                )
                .keep(KeepRule::AnyOf(vec!["title"])),
            ],
        ))
        .presence(PresenceRule::FieldsOrFirstList(vec!["heroTitle"]))
        .title_fields(&["heroTitle"])
}

fn media_schema() -> Schema {
    Schema::new("media")
        .field(FieldSpec::scalar("heroTitle"))
        .field(
            FieldSpec::group_list(
                "mediaLinks",
                vec![FieldSpec::scalar("label"), FieldSpec::scalar("url").url()],
            )
            .keep(KeepRule::AnyOf(vec!["label", "url"])),
        )
        .field(
            FieldSpec::group_list(
                "articles",
                vec![
                    FieldSpec::scalar("label"),
                    FieldSpec::scalar("source"),
                    FieldSpec::flat_list("links").alias("urls").alias("url").url(),
                ],
            )
            .keep(KeepRule::AnyOf(vec!["label", "links"])),
        )
        .presence(PresenceRule::FieldsOrFirstList(vec!["heroTitle"]))
        .title_fields(&["heroTitle"])
}

fn partnerships_schema() -> Schema {
    Schema::new("partnerships")
        .field(FieldSpec::scalar("heroTitle"))
        .field(
            FieldSpec::group_list(
                "partnerships",
                vec![
                    FieldSpec::scalar("id"),
                    FieldSpec::scalar("name"),
                    FieldSpec::scalar("logo").decorative(),
                    FieldSpec::scalar("website").url(),
                ],
            )
            .keep(KeepRule::AnyOf(vec!["name", "website"])),
        )
        .presence(PresenceRule::Fields(vec!["heroTitle"]))
        .title_fields(&["heroTitle"])
}

fn faq_schema() -> Schema {
    Schema::new("faq")
        .field(FieldSpec::scalar("title"))
        .field(
            FieldSpec::group_list(
                "questions",
                vec![FieldSpec::scalar("question"), FieldSpec::scalar("answer")],
            )
            .keep(KeepRule::AnyOf(vec!["question"])),
        )
        .presence(PresenceRule::FieldsOrFirstList(vec!["title"]))
        .title_fields(&["title"])
}
