//! Cascade demo: build a small tree, match a few rules against it and print
//! the computed values that come out.
//!
//! Set `RUST_LOG=trace` to watch the selector walks and cache fills.

use cascade::css;
use cascade::dom::{Dom, NodeId};
use cascade::style::{
    Declaration, MatchingContext, PropertyRegistry, StaticLayout, StyleError, StyleOrigin,
    StyleRule, StyleStore, StyleValue, Unit, cascade_tree,
};

fn build_tree(dom: &mut Dom) -> (NodeId, Vec<NodeId>) {
    let html = dom.create_html_element("html", &[]);
    let body = dom.create_html_element("body", &[]);
    let h1 = dom.create_html_element("h1", &[]);
    let intro = dom.create_html_element("p", &[("class", "intro")]);
    let features = dom.create_html_element("div", &[("class", "features"), ("id", "list")]);
    let ul = dom.create_html_element("ul", &[]);
    dom.append_child(html, body);
    dom.append_child(body, h1);
    dom.append_child(body, intro);
    dom.append_child(body, features);
    dom.append_child(features, ul);

    let mut items = Vec::new();
    for text in ["Selector parser", "Selector matcher", "Value pipeline"] {
        let li = dom.create_html_element("li", &[]);
        let label = dom.create_text(text);
        dom.append_child(li, label);
        dom.append_child(ul, li);
        items.push(li);
    }
    (html, vec![body, h1, intro, features, ul, items[0], items[2]])
}

fn main() -> Result<(), StyleError> {
    env_logger::init();

    println!("── Selectors ──");
    for source in ["ul > li:first-child", "#list li, .intro", "svg|rect", "div >"] {
        match css::parse_str(source) {
            Ok(list) => println!(
                "   {source:<22} → {list}  specificity {}",
                list.max_specificity()
            ),
            Err(err) => println!("   {source:<22} → {err}"),
        }
    }

    let mut dom = Dom::new();
    let (root, shown) = build_tree(&mut dom);

    let rules = vec![
        StyleRule::parse(
            "html",
            vec![
                Declaration::new("color", StyleValue::keyword("black")),
                Declaration::new("font-size", StyleValue::px(16.0)),
            ],
            StyleOrigin::UserAgent,
            0,
        )?,
        StyleRule::parse(
            "body",
            vec![Declaration::new("margin-left", StyleValue::px(8.0))],
            StyleOrigin::UserAgent,
            0,
        )?,
        StyleRule::parse(
            "h1",
            vec![Declaration::new("font-size", StyleValue::dimension(2.0, Unit::Em))],
            StyleOrigin::Author,
            1,
        )?,
        StyleRule::parse(
            ".intro",
            vec![Declaration::new("color", StyleValue::keyword("gray"))],
            StyleOrigin::Author,
            1,
        )?,
        StyleRule::parse(
            "#list",
            vec![
                Declaration::new("padding-left", StyleValue::Percentage(5.0)),
                Declaration::new("width", StyleValue::Percentage(50.0)),
            ],
            StyleOrigin::Author,
            1,
        )?,
        StyleRule::parse(
            "ul > li:first-child",
            vec![Declaration::new("font-weight", StyleValue::keyword("bold"))],
            StyleOrigin::Author,
            1,
        )?,
        StyleRule::parse(
            "li:last-child",
            vec![Declaration::new("font-weight", StyleValue::Inherit)],
            StyleOrigin::Author,
            1,
        )?,
    ];

    let mut store = StyleStore::new(PropertyRegistry::standard());
    store.subscribe(|change| {
        log::debug!(
            "{:?} {}: {} → {} ({:?})",
            change.element,
            change.property,
            change.old,
            change.new,
            change.dirt
        );
    });
    let changed = cascade_tree(&mut store, &dom, root, &rules, &MatchingContext::new())?;
    println!("\n── Cascade ──\n   {changed} assigned values");

    let layout = StaticLayout::new(1024.0, 768.0);
    println!("\n── Computed ──");
    for id in shown {
        let name = dom
            .element(id)
            .map(|e| e.local_name.clone())
            .unwrap_or_default();
        let mut line = format!("   {name:<5}");
        for property in ["color", "font-size", "font-weight", "padding-left", "width"] {
            let value = store.computed(id, property, &layout)?;
            line.push_str(&format!(" {property}={value}"));
        }
        println!("{line}");
    }
    Ok(())
}
