//! Built-in Typst journal report template with `{{PLACEHOLDER}}` markers.

const TEMPLATE: &str = r#"#set page(paper: "a4", margin: (x: 1.8cm, y: 2cm), flipped: false)
#set text(font: "New Computer Modern", size: 10pt)
#set table(stroke: 0.5pt + gray, inset: 5pt)

#align(center)[
  #text(size: 18pt, weight: "bold")[{{TITLE}}]

  #text(size: 11pt, fill: gray)[{{DATE_RANGE}}]
]

= Summary

{{SUMMARY_TABLE}}

= Cumulative P&L

{{CUMULATIVE_CHART}}

= Win / Loss

{{WIN_LOSS}}

#pagebreak()

= Trade Log

#set page(flipped: true)

{{TRADE_LOG}}
"#;

pub fn template() -> &'static str {
    TEMPLATE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_has_every_placeholder() {
        for marker in [
            "{{TITLE}}",
            "{{DATE_RANGE}}",
            "{{SUMMARY_TABLE}}",
            "{{CUMULATIVE_CHART}}",
            "{{WIN_LOSS}}",
            "{{TRADE_LOG}}",
        ] {
            assert!(template().contains(marker), "missing {marker}");
        }
    }
}
