//! HTML pages.
//!
//! Templates and the stylesheet are embedded in the binary.

use minijinja::{context, Environment, Value};
use serde::Serialize;

use markdump_search::QueryMatch;
use markdump_types::{Crumb, Directory, Document};

const LAYOUT_TEMPLATE: &str = include_str!("../templates/layout.html");
const DIR_TEMPLATE: &str = include_str!("../templates/dir.html");
const FILE_TEMPLATE: &str = include_str!("../templates/file.html");
const SEARCH_TEMPLATE: &str = include_str!("../templates/search.html");

/// Embedded stylesheet served under `/static/style.css`.
pub const STYLESHEET: &str = include_str!("../static/style.css");

#[derive(Debug, Serialize)]
struct ChildView<'a> {
    title: &'a str,
    url: &'a str,
    is_dir: bool,
}

/// Page renderer.
pub struct Pages {
    env: Environment<'static>,
    // URL prefix without trailing slash
}

impl Pages {
    /// Load the embedded templates. `base_url` is the path the site is
    /// mounted under.
    pub fn new(base_url: &str) -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("layout.html", LAYOUT_TEMPLATE)?;
        env.add_template("dir.html", DIR_TEMPLATE)?;
        env.add_template("file.html", FILE_TEMPLATE)?;
        env.add_template("search.html", SEARCH_TEMPLATE)?;

        let prefix = base_url.trim_end_matches('/').to_string();
        // Tree URLs are built from slugs only.
        env.add_filter("href", move |url: &str| {
            Value::from_safe_string(format!("{}{}", prefix, url))
        });

        Ok(Self { env })
    }

    pub fn directory(&self, dir: &Directory) -> Result<String, minijinja::Error> {
        let children: Vec<ChildView> = dir
            .children()
            .iter()
            .map(|child| ChildView {
                title: child.title(),
                url: child.url(),
                is_dir: child.is_directory(),
            })
            .collect();

        self.env.get_template("dir.html")?.render(context! {
            title => dir.title,
            heading => dir.title,
            search => "",
            crumbs => dir.ancestors,
            dir => dir.crumb(),
            children => children,
        })
    }

    pub fn document(&self, dir: &Directory, doc: &Document) -> Result<String, minijinja::Error> {
        let mut crumbs: Vec<Crumb> = dir.ancestors.clone();
        crumbs.push(dir.crumb());

        self.env.get_template("file.html")?.render(context! {
            title => doc.title,
            heading => doc.title,
            search => "",
            crumbs => crumbs,
            dir => dir.crumb(),
            body => doc.html,
        })
    }

    pub fn search(&self, search: &str, matches: &[QueryMatch]) -> Result<String, minijinja::Error> {
        let title = format!("Search: {}", search);
        self.env.get_template("search.html")?.render(context! {
            title => title,
            heading => title,
            search => search,
            crumbs => Vec::<Crumb>::new(),
            matches => matches,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markdump_tree::TreeBuilder;
    use std::fs;
    use tempfile::TempDir;

    fn tree() -> (TempDir, Directory) {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("Guides")).unwrap();
        fs::write(temp.path().join("Guides/Setup.md"), "# Setup\n\n<b>raw</b>").unwrap();
        fs::write(temp.path().join("About.md"), "about").unwrap();
        let root = TreeBuilder::default().build(temp.path()).unwrap().root;
        (temp, root)
    }

    #[test]
    fn test_directory_page_lists_children() {
        let (_temp, root) = tree();
        let pages = Pages::new("/").unwrap();
        let html = pages.directory(&root).unwrap();
        assert!(html.contains("<title>Home</title>"));
        assert!(html.contains(r#"<a href="/about">About</a>"#));
        assert!(html.contains(r#"<li class="dir"><a href="/guides">Guides</a></li>"#));
    }

    #[test]
    fn test_document_page_has_crumbs_and_body() {
        let (_temp, root) = tree();
        let dir = root.subdir("guides").unwrap();
        let doc = dir.document("setup").unwrap();

        let pages = Pages::new("/wiki/").unwrap();
        let html = pages.document(dir, doc).unwrap();
        assert!(html.contains(r#"<a href="/wiki/">Home</a>"#));
        assert!(html.contains(r#"<a href="/wiki/guides">Guides</a>"#));
        assert!(html.contains("<h1>Setup</h1>"));
        assert!(html.contains(r#"href="/wiki/static/style.css""#));
    }

    #[test]
    fn test_search_page_escapes_input_not_matches() {
        let pages = Pages::new("/").unwrap();
        let matches = vec![QueryMatch {
            href: "/fox".to_string(),
            path: "Home / ".to_string(),
            name: "<mark>Fox</mark>".to_string(),
            content: "The <mark>quick</mark> fox".to_string(),
        }];
        let html = pages.search("<quick>", &matches).unwrap();
        assert!(html.contains("Search: &lt;quick&gt;"));
        assert!(html.contains("<mark>Fox</mark>"));
        assert!(html.contains("The <mark>quick</mark> fox"));
    }

    #[test]
    fn test_search_page_without_matches() {
        let pages = Pages::new("/").unwrap();
        let html = pages.search("nothing", &[]).unwrap();
        assert!(html.contains("No matches."));
    }
}
