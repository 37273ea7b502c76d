use crate::browser::mock::MockPage;
use crate::error::{Error, Result};
use crate::extractors::{Dom, ExtractionEnsemble, Extractor};
use crate::results::PageDocument;

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://example.com/post";

    struct Failing;

    impl Extractor for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn extract(&self, _dom: &Dom) -> Result<Vec<String>> {
            Err(Error::Evaluation("boom".to_string()))
        }
    }

    struct Fixed(&'static str, Vec<&'static str>);

    impl Extractor for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }

        fn extract(&self, _dom: &Dom) -> Result<Vec<String>> {
            Ok(self.1.iter().map(|s| s.to_string()).collect())
        }
    }

    #[test]
    fn test_article_scenario() {
        let ensemble = ExtractionEnsemble::new();
        let mut doc = PageDocument::new(URL);
        let added =
            ensemble.extract_snapshot("<article><p>A</p><p>B</p></article>", URL, &mut doc);
        assert_eq!(added, 2);
        assert_eq!(doc.content, vec!["A", "B"]);
    }

    #[test]
    fn test_extract_is_idempotent() {
        let html = r#"<html><head><title>T</title></head><body>
            <main><h1>Heading of the post</h1>
            <p>The first paragraph of the post has plenty of words in it.</p>
            <p>The second paragraph of the post also has plenty of words.</p></main>
            <img src="/a.png"></body></html>"#;
        let ensemble = ExtractionEnsemble::new();
        let mut doc = PageDocument::new(URL);

        let first = ensemble.extract_snapshot(html, URL, &mut doc);
        let size = doc.content.len();
        assert!(first > 0);

        let second = ensemble.extract_snapshot(html, URL, &mut doc);
        assert_eq!(second, 0);
        assert_eq!(doc.content.len(), size);
        assert_eq!(doc.images.len(), 1);
    }

    #[test]
    fn test_content_only_grows() {
        let ensemble = ExtractionEnsemble::new();
        let mut doc = PageDocument::new(URL);
        let pages = [
            "<article><p>One</p><p>Two</p></article>",
            "<article><p>Three</p></article>",
            "<p>short</p>",
        ];

        let mut previous = 0;
        for html in pages {
            ensemble.extract_snapshot(html, URL, &mut doc);
            assert!(doc.content.len() >= previous);
            previous = doc.content.len();
        }
        assert_eq!(doc.content, vec!["One", "Two", "Three"]);
    }

    #[test]
    fn test_failing_extractor_does_not_affect_others() {
        let ensemble = ExtractionEnsemble::with_extractors(vec![
            Box::new(Fixed("first", vec!["alpha"])),
            Box::new(Failing),
            Box::new(Fixed("last", vec!["omega", "alpha"])),
        ]);
        let mut doc = PageDocument::new(URL);
        let added = ensemble.extract_snapshot("<p>x</p>", URL, &mut doc);
        assert_eq!(added, 2);
        assert_eq!(doc.content, vec!["alpha", "omega"]);
    }

    #[test]
    fn test_default_battery_order() {
        let names = ExtractionEnsemble::new().names();
        assert_eq!(names.first(), Some(&"structured_data"));
        assert_eq!(names.last(), Some(&"text_density"));
        assert_eq!(names.len(), 13);
    }

    #[test]
    fn test_title_and_metadata_are_collected() {
        let html = r#"<html lang="fr"><head><title>Doc</title>
            <meta name="description" content="Desc"></head>
            <body><h1>Headline</h1></body></html>"#;
        let mut doc = PageDocument::new(URL);
        ExtractionEnsemble::new().extract_snapshot(html, URL, &mut doc);
        assert_eq!(doc.title.as_deref(), Some("Headline"));
        assert_eq!(doc.metadata["description"], "Desc");
        assert_eq!(doc.metadata["language"], "fr");
    }

    #[tokio::test]
    async fn test_extract_from_live_page() {
        let page = MockPage::new(URL, "<article><p>Live</p></article>");
        let mut doc = PageDocument::new(URL);
        let added = ExtractionEnsemble::new().extract(&page, &mut doc).await;
        assert_eq!(added, 1);
        assert_eq!(doc.content, vec!["Live"]);
    }

    #[tokio::test]
    async fn test_extract_never_fails_when_snapshot_fails() {
        let page = MockPage::new(URL, "<article><p>Live</p></article>").with_failing_html();
        let mut doc = PageDocument::new(URL);
        assert_eq!(ExtractionEnsemble::new().extract(&page, &mut doc).await, 0);
        assert!(doc.content.is_empty());
    }
}
