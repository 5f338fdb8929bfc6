//! Prometheus text exposition format.
//!
//! Renders gathered samples into the Prometheus text exposition format
//! for scraping by a Prometheus server or compatible agent.

use std::collections::HashMap;
use std::sync::Arc;

use crate::descriptor::{Descriptor, Sample};

/// Render samples into Prometheus text format.
///
/// Families are written in `descriptors` order. A family with no samples
/// this cycle is omitted entirely, and samples whose descriptor was never
/// declared are dropped.
pub fn render_prometheus(descriptors: &[Arc<Descriptor>], samples: &[Sample]) -> String {
    let mut by_name: HashMap<&str, Vec<&Sample>> = HashMap::new();
    for s in samples {
        by_name.entry(s.desc.fq_name()).or_default().push(s);
    }

    let mut out = String::new();
    for desc in descriptors {
        let Some(family) = by_name.get(desc.fq_name()) else {
            continue;
        };

        out.push_str(&format!(
            "# HELP {} {}\n",
            desc.fq_name(),
            escape_help(desc.help())
        ));
        out.push_str(&format!("# TYPE {} {}\n", desc.fq_name(), desc.kind()));
        for s in family {
            out.push_str(desc.fq_name());
            push_labels(&mut out, desc.label_names(), &s.label_values);
            out.push(' ');
            out.push_str(&format_value(s.value));
            out.push('\n');
        }
    }

    out
}

fn push_labels(out: &mut String, names: &[String], values: &[String]) {
    if names.is_empty() {
        return;
    }
    out.push('{');
    for (i, (name, value)) in names.iter().zip(values).enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&format!("{name}=\"{}\"", escape_label_value(value)));
    }
    out.push('}');
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        format!("{v}")
    }
}

fn escape_help(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\n', "\\n")
}

fn escape_label_value(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
