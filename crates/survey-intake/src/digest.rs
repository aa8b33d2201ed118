//! Themed "best quotes" page built from the testimonials store.
//!
//! Only promoter testimonials (nps >= 9) make the page. Each one is assigned a theme by an
//! ordered keyword table over the lower-cased quote; the first row with a matching keyword
//! wins and quotes matching nothing fall back to the impact section. Within a section,
//! quotes keep the order of the testimonials store.

use crate::model::Testimonial;

const MIN_NPS: i64 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Impact,
    Ease,
    Career,
    Federal,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Impact, Theme::Ease, Theme::Career, Theme::Federal];

    pub fn heading(self) -> &'static str {
        match self {
            Theme::Impact => "Impact & Confidence Building",
            Theme::Ease => "Ease of Use",
            Theme::Career => "Career Value",
            Theme::Federal => "Federal/Government Relevance",
        }
    }

    fn index(self) -> usize {
        match self {
            Theme::Impact => 0,
            Theme::Ease => 1,
            Theme::Career => 2,
            Theme::Federal => 3,
        }
    }
}

/// Keyword rules in priority order.
const RULES: [(&[&str], Theme); 4] = [
    (&["impact", "confidence", "build"], Theme::Impact),
    (&["easy", "simple", "quick"], Theme::Ease),
    (&["career", "job", "role"], Theme::Career),
    (&["federal", "government", "policy"], Theme::Federal),
];

const DEFAULT_THEME: Theme = Theme::Impact;

pub fn classify(quote: &str) -> Theme {
    let lower = quote.to_lowercase();
    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, theme)| *theme)
        .unwrap_or(DEFAULT_THEME)
}

/// Escape text for HTML element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

fn blockquote(t: &Testimonial) -> String {
    format!(
        "<blockquote>\"{}\"<br><cite>{}, {}</cite></blockquote>",
        escape_html(&t.quote),
        escape_html(&t.name),
        escape_html(&t.title)
    )
}

/// Group promoter testimonials by theme, one rendered blockquote per entry.
pub fn bucket(testimonials: &[Testimonial]) -> [Vec<String>; 4] {
    let mut buckets: [Vec<String>; 4] = Default::default();
    for t in testimonials.iter().filter(|t| t.nps >= MIN_NPS) {
        buckets[classify(&t.quote).index()].push(blockquote(t));
    }
    buckets
}

pub fn render_digest(testimonials: &[Testimonial]) -> String {
    let buckets = bucket(testimonials);

    let mut html = String::from(
        "<!doctype html>
<html lang='en'>
<head>
  <meta charset='utf-8' />
  <meta name='viewport' content='width=device-width,initial-scale=1' />
  <title>Marketing Gold - Best Quotes</title>
  <style>
    body{font-family:Arial,sans-serif;margin:20px;color:#333}
    h1{color:#1B3B6F}
    h2{color:#C19A6B}
    blockquote{margin:10px 0;padding:10px;border-left:4px solid #C19A6B;background:#f9f9f9}
    cite{font-style:italic;color:#666}
  </style>
</head>
<body>
  <h1>Marketing Gold: Best Testimonials</h1>
  <p>Organized by theme for easy copy-paste into marketing materials.</p>
",
    );
    for theme in Theme::ALL {
        html.push_str(&format!(
            "\n  <h2>{}</h2>\n  {}\n",
            theme.heading(),
            buckets[theme.index()].concat()
        ));
    }
    html.push_str("</body>\n</html>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn testimonial(quote: &str, nps: i64) -> Testimonial {
        Testimonial {
            name: "Dana".to_string(),
            title: "Analyst".to_string(),
            quote: quote.to_string(),
            nps,
            ..Default::default()
        }
    }

    #[test]
    fn classify_follows_rule_priority() {
        assert_eq!(classify("Building confidence was easy"), Theme::Impact);
        assert_eq!(classify("So EASY and quick"), Theme::Ease);
        assert_eq!(classify("Simple, and great for my career"), Theme::Ease);
        assert_eq!(classify("Helps in my job"), Theme::Career);
        assert_eq!(classify("Relevant to government policy work"), Theme::Federal);
        assert_eq!(classify("Loved it"), Theme::Impact);
    }

    #[test]
    fn classify_matches_substrings() {
        // "rebuild" contains "build"; "roleplay" contains "role".
        assert_eq!(classify("We will rebuild our process"), Theme::Impact);
        assert_eq!(classify("The roleplay exercise"), Theme::Career);
    }

    #[test]
    fn escape_html_covers_special_characters() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#039;Jerry&#039;&lt;/b&gt;"
        );
    }

    #[test]
    fn bucket_skips_low_scores_and_keeps_order() {
        let ts = vec![
            testimonial("first impact", 10),
            testimonial("easy one", 9),
            testimonial("impact but low score", 8),
            testimonial("second, no keywords", 9),
        ];
        let [impact, ease, career, federal] = bucket(&ts);
        assert_eq!(impact.len(), 2);
        assert!(impact[0].contains("first impact"));
        assert!(impact[1].contains("second, no keywords"));
        assert_eq!(ease.len(), 1);
        assert!(career.is_empty());
        assert!(federal.is_empty());
    }

    #[test]
    fn render_places_quotes_under_their_headings() {
        let ts = vec![
            testimonial("This built my confidence", 10),
            testimonial("Useful for federal teams", 9),
        ];
        let html = render_digest(&ts);

        let impact = html.find("<h2>Impact & Confidence Building</h2>").unwrap();
        let ease = html.find("<h2>Ease of Use</h2>").unwrap();
        let career = html.find("<h2>Career Value</h2>").unwrap();
        let federal = html.find("<h2>Federal/Government Relevance</h2>").unwrap();
        assert!(impact < ease && ease < career && career < federal);

        let built = html.find("This built my confidence").unwrap();
        assert!(impact < built && built < ease);
        let fed = html.find("Useful for federal teams").unwrap();
        assert!(federal < fed);

        assert!(html.contains(
            "<blockquote>\"This built my confidence\"<br><cite>Dana, Analyst</cite></blockquote>"
        ));
        assert!(html.starts_with("<!doctype html>"));
        assert!(html.ends_with("</html>"));
    }

    #[test]
    fn render_escapes_testimonial_text() {
        let mut t = testimonial("<script>alert(1)</script> impact", 10);
        t.name = "A & B".to_string();
        let html = render_digest(&[t]);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("<cite>A &amp; B, Analyst</cite>"));
    }

    #[test]
    fn render_with_no_promoters_still_has_all_sections() {
        let html = render_digest(&[testimonial("meh", 3)]);
        for theme in Theme::ALL {
            assert!(html.contains(theme.heading()));
        }
        assert!(!html.contains("<blockquote>"));
    }
}
