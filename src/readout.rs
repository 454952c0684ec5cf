use magnitude_core::{BackendKind, Readout};

/// Plain value text: integers without a fraction, small values with up to
/// three decimals, large ones in scientific notation.
pub fn format_value(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    let a = v.abs();
    if a >= 1e9 {
        format!("{:.3e}", v)
    } else if v.fract() == 0.0 {
        format!("{:.0}", v)
    } else {
        let s = format!("{:.3}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

pub fn backend_label(kind: Option<BackendKind>) -> &'static str {
    match kind {
        Some(BackendKind::Gpu) => "GPU",
        Some(BackendKind::Canvas2d) => "Canvas2D",
        None => "-",
    }
}

/// One line of status text for the readout element.
pub fn readout_text(r: &Readout) -> String {
    let (_, hi) = r.range;
    let mut parts = vec![
        if r.level == r.target {
            format!("k={}", r.level.get())
        } else {
            format!("k={}→{}", r.level.get(), r.target.get())
        },
        format!("range ±{}", format_value(hi)),
        format!("block {}", format_value(r.block_unit)),
        format!("A {}", format_value(r.value_a)),
    ];
    if let Some(b) = r.value_b {
        parts.push(format!("B {}", format_value(b)));
    }
    parts.push(format!("blocks −{} / +{}", r.counts[0], r.counts[1]));
    if r.symmetric {
        parts.push("symmetric".to_string());
    }
    if r.step_mode {
        parts.push("stepped".to_string());
    }
    parts.push(backend_label(r.backend).to_string());
    parts.join(" · ")
}
