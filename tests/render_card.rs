//! End-to-end rendering through comrak and ammonia.

use cardmark::core::{decompose, highlight_markup, reassemble};
use cardmark::models::{BoundaryRule, Fragment};
use cardmark::{
    CardPage, CardRenderer, HighlightSpec, NormalizationPolicy, RenderConfig, TermSet,
    TruncationBudget, render_card,
};

fn highlighted(text: &str, spec: HighlightSpec) -> Vec<String> {
    render_card(text, &spec, None)
        .fragments()
        .iter()
        .filter_map(|f| match f {
            Fragment::Highlighted(s) => Some(s.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_identity_on_sanitized_markup() {
    let markup = cardmark::utils::markdown_to_html(
        "# Title\n\nSome **bold** [link](https://example.com/) & more\n\n- a\n- b\n",
    );
    let result = highlight_markup(&markup, &TermSet::empty(), BoundaryRule::UnicodeLetter);
    assert_eq!(result.to_html(), markup);
    assert_eq!(reassemble(&decompose(&markup)), markup);
}

#[test]
fn test_boundary_correctness() {
    assert_eq!(
        highlighted("Techlead / AI / sport", HighlightSpec::from("AI")),
        vec!["AI"]
    );
    assert!(highlighted("Techlead / Taiwan / sport", HighlightSpec::from("AI")).is_empty());
}

#[test]
fn test_boundary_multilingual() {
    assert_eq!(
        highlighted(
            "Техлидство / AI / спорт: https://t.me/etechlead",
            HighlightSpec::list(["AI"])
        ),
        vec!["AI"]
    );
    assert_eq!(
        highlighted("Программирую на JS и Python", HighlightSpec::list(["JS"])),
        vec!["JS"]
    );
}

#[test]
fn test_link_label_extraction() {
    let result = render_card(
        "Hosting: [REG.RU](https://reg.ru/)",
        &HighlightSpec::from("[REG.RU](https://reg.ru/)"),
        None,
    );
    let html = result.to_html();

    assert!(html.contains("href=\"https://reg.ru/\""));
    assert!(html.contains("<mark class=\"highlight\">REG.RU</mark></a>"));
    assert_eq!(result.highlight_count(), 1);
    for fragment in result.fragments() {
        if let Fragment::RawTag(tag) = fragment {
            assert!(!tag.contains("<mark"));
        }
    }
}

#[test]
fn test_terms_with_escaped_characters() {
    let result = render_card(
        "Worked in R&D and Q&A teams",
        &HighlightSpec::list(["R&D", "Q&A"]),
        None,
    );
    assert_eq!(result.highlight_count(), 2);
    assert!(result.to_html().starts_with(
        "<p>Worked in <mark class=\"highlight\">R&amp;D</mark> and \
         <mark class=\"highlight\">Q&amp;A</mark> teams</p>"
    ));
    assert_eq!(result.plain_text(), "Worked in R&D and Q&A teams");
}

#[test]
fn test_decomposed_term_and_text() {
    let result = render_card(
        "I love cafe\u{301} culture",
        &HighlightSpec::from("cafe\u{301}"),
        None,
    );
    assert_eq!(result.highlight_count(), 1);
    assert!(result.to_html().contains("<mark class=\"highlight\">cafe\u{301}</mark>"));
}

#[test]
fn test_phrase_precedence() {
    let result = highlighted(
        "Author: Panchenko Daniil, backend developer",
        HighlightSpec::list(["Panchenko", "Panchenko Daniil"]),
    );
    assert_eq!(result, vec!["Panchenko Daniil"]);
}

#[test]
fn test_terms_never_touch_attributes() {
    let html = render_card(
        "Visit [my blog](https://blog.example.com/rust)",
        &HighlightSpec::list(["blog", "rust", "href", "noopener"]),
        None,
    )
    .to_html();

    assert!(html.contains("href=\"https://blog.example.com/rust\""));
    assert!(html.contains("rel=\"noopener noreferrer\""));
    assert!(html.contains("<mark class=\"highlight\">blog</mark>"));
    assert!(!html.contains("<mark class=\"highlight\">rust</mark>"));
}

#[test]
fn test_truncation_safety() {
    let mut words: Vec<String> = (1..=49).map(|n| format!("word{}", n)).collect();
    words.push("**bold".to_string());
    words.push("claim**".to_string());
    words.extend((52..=80).map(|n| format!("word{}", n)));
    let text = words.join(" ");

    let truncated = cardmark::core::truncate_preview(&text, &TruncationBudget::default());
    assert_eq!(truncated.matches("**").count() % 2, 0);

    let rendered = render_card(&text, &HighlightSpec::Absent, Some(&TruncationBudget::default()));
    assert!(!rendered.plain_text().contains("**"));
}

#[test]
fn test_no_op_on_empty_text() {
    let specs = [
        HighlightSpec::Absent,
        HighlightSpec::from("AI"),
        HighlightSpec::list(["[REG.RU](https://reg.ru/)", "x"]),
    ];
    for spec in specs {
        assert!(render_card("", &spec, None).is_empty());
        assert!(render_card("", &spec, Some(&TruncationBudget::default())).is_empty());
    }
}

#[test]
fn test_highlight_across_list_items() {
    let result = highlighted(
        "Stack:\n\n- Rust\n- Go\n- rust-analyzer",
        HighlightSpec::from("rust"),
    );
    assert_eq!(result, vec!["Rust", "rust"]);
}

#[test]
fn test_legacy_policy_selected_explicitly() {
    let config = RenderConfig {
        policy: NormalizationPolicy::for_version(cardmark::models::PolicyVersion::V1),
        ..RenderConfig::default()
    };
    let renderer = CardRenderer::new(config);
    let result = renderer.render_full("Работаю в IT сфере", &HighlightSpec::from("IT"));
    assert_eq!(result.highlight_count(), 0);
}

#[test]
fn test_page_of_records() {
    let json = r#"{
        "cards": [
            {"author": "@dp (Daniil Panchenko)", "text": "Backend on **Rust**", "highlightText": ["rust"]},
            {"author": "@an", "text": "Designer", "highlightText": null}
        ],
        "totalCount": 2
    }"#;
    let page: CardPage = serde_json::from_str(json).unwrap();
    let renderer = CardRenderer::default();

    let first = renderer.render_record(&page.cards[0], true);
    assert!(first.to_html().contains("<strong><mark class=\"highlight\">Rust</mark></strong>"));

    let second = renderer.render_record(&page.cards[1], true);
    assert_eq!(second.highlight_count(), 0);
    assert_eq!(page.cards[0].full_name(), Some("Daniil Panchenko"));
}

#[test]
fn test_serialized_segments() {
    let result = render_card("hi rust", &HighlightSpec::from("rust"), None);
    let value = serde_json::to_value(&result).unwrap();
    let kinds: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["kind"].as_str().unwrap())
        .collect();
    assert!(kinds.contains(&"highlighted"));
    assert!(kinds.contains(&"rawTag"));
    assert!(kinds.contains(&"text"));
}
