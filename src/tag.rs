//! Defines the [`Tag`] type, which represents a [`crate::post::Post`] tag.

use gtmpl::Value;
use std::hash::{Hash, Hasher};
use url::Url;

/// Represents a [`crate::post::Post`] tag. Tag identity is the slugified
/// name so e.g. `macOS` and `MacOS` resolve to the same tag, and so the
/// name can be dropped into a [`Url`] or an output path.
#[derive(Clone, Debug)]
pub struct Tag {
    /// The tag's slugified name.
    pub name: String,

    /// The URL for the tag's first index page. Given an `index_base_url`,
    /// this looks like `{index_base_url}/{tag_name}/index.html`.
    pub url: Url,
}

impl Tag {
    /// Builds a [`Tag`] from a raw tag string and the base URL for index
    /// pages.
    pub fn new(raw: &str, index_base_url: &Url) -> Result<Tag, url::ParseError> {
        let name = slug::slugify(raw);
        let url = index_base_url.join(&format!("{}/index.html", name))?;
        Ok(Tag { name, url })
    }

    /// The human-facing name for the tag. A handful of abbreviated tags get
    /// spelled-out names; everything else is first-letter capitalized.
    pub fn display_name(&self) -> String {
        match self.name.as_str() {
            "r" => "R".to_owned(),
            "ml" => "Machine Learning".to_owned(),
            "org-mode" => "Org-mode".to_owned(),
            "data-science" => "Data Science".to_owned(),
            "bio" => "Biology".to_owned(),
            "stats" => "Statistics".to_owned(),
            name => {
                let mut chars = name.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                }
            }
        }
    }

    /// The CSS class used to color the tag's card badge. Tags that don't
    /// fall into a known bucket get no class.
    pub fn css_class(&self) -> &'static str {
        let name = self.name.as_str();
        if name.contains("python") {
            "python"
        } else if name.contains('r') {
            "r"
        } else if name.contains("ml") || name.contains("machine") {
            "ml"
        } else if name.contains("bio") {
            "biology"
        } else if name.contains("stat") {
            "statistics"
        } else {
            ""
        }
    }
}

impl Hash for Tag {
    /// Implements [`Hash`] for [`Tag`] by delegating directly to the `name`
    /// field.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state)
    }
}

impl PartialEq for Tag {
    /// Implements [`PartialEq`] and [`Eq`] for [`Tag`] by delegating
    /// directly to the `name` field.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
impl Eq for Tag {}

impl From<&Tag> for Value {
    /// Converts [`Tag`]s into [`Value`]s for templating.
    fn from(t: &Tag) -> Value {
        use std::collections::HashMap;
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("tag".to_owned(), Value::String(t.name.clone()));
        m.insert("display".to_owned(), Value::String(t.display_name()));
        m.insert("class".to_owned(), Value::String(t.css_class().to_owned()));
        m.insert("url".to_owned(), Value::String(t.url.to_string()));
        Value::Object(m)
    }
}
