//! Facet vocabulary listing.

use serde::Serialize;
use strum::IntoEnumIterator;
use tabled::Tabled;

use breachwatch_core::FilterKind;

use crate::cli::{FacetsArgs, GlobalOpts};
use crate::output;

/// One pickable value, or a free-form kind when `value` is `None`.
#[derive(Debug, Serialize)]
struct FacetEntry {
    kind: FilterKind,
    value: Option<&'static str>,
    label: &'static str,
}

#[derive(Tabled)]
struct FacetRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Label")]
    label: String,
}

impl From<&FacetEntry> for FacetRow {
    fn from(e: &FacetEntry) -> Self {
        Self {
            kind: e.kind.to_string(),
            value: e.value.unwrap_or("*").to_owned(),
            label: e.label.to_owned(),
        }
    }
}

fn entries(only: Option<FilterKind>) -> Vec<FacetEntry> {
    FilterKind::iter()
        .filter(|k| only.is_none_or(|o| o == *k))
        .flat_map(|kind| {
            let options = kind.options();
            if options.is_empty() {
                vec![FacetEntry {
                    kind,
                    value: None,
                    label: "free-form value",
                }]
            } else {
                options
                    .iter()
                    .map(|o| FacetEntry {
                        kind,
                        value: Some(o.value),
                        label: o.label,
                    })
                    .collect()
            }
        })
        .collect()
}

pub fn handle(args: &FacetsArgs, global: &GlobalOpts) {
    let data = entries(args.kind);
    let out = output::render_list(
        global.output(),
        &data,
        |e| FacetRow::from(e),
        |e| match e.value {
            Some(v) => format!("{}:{v}", e.kind),
            None => e.kind.to_string(),
        },
    );
    output::print_output(&out, global.quiet);
}
