//! Layout request text sent to the oracle
//!
//! The element table and the id list both carry element ids verbatim; the
//! oracle is told to echo them, and exact-id matching depends on that.

use crate::layout::{CanvasFrame, Element};

const ID_WIDTH: usize = 25;
const TYPE_WIDTH: usize = 15;
const POSITION_WIDTH: usize = 40;
const SIZE_WIDTH: usize = 20;
const RULE_WIDTH: usize = 100;

/// Build the complete prompt for one arrangement request
pub fn build_prompt(elements: &[Element], frame: &CanvasFrame) -> String {
    format!(
        r#"# Layer re-layout task

## Goal
Adapt a design from its original canvas size to a new target size while keeping the
composition balanced and professional. Every foreground layer must be kept, and text
must never overlap products or other text.

## Input
- **Original size**: {source_w}x{source_h} (width x height)
- **Target size**: {target_w}x{target_h} (width x height)

## Layer ids (use these exact ids)
{ids}

## Layer data
```
{table}
```

## Rules

### 1. Principles
- Each layer may only be moved and resized. Resizing must be proportional: never change a layer's aspect ratio.
- After adjustment no coordinate may be below 0 and no edge may extend past the target size.
- Keep the visual hierarchy between layers.
- Keep text legible and never cropped.
- Show products and main subjects in full.
- Avoid overlaps between layers, especially between text and products. Resize and move text as needed to fit the new layout.
- Keep the composition balanced.
- Do not change any layer's visibility.

### 2. Strategy by layer type
**Background layers** (type "background", "pixel", or a shape covering the whole canvas):
- Crop width or height to the target size, or crop around the center so the focal point stays on the canvas.

**Decorative shapes** (type "shape"):
- If a shape falls outside the new canvas, scale it down proportionally or reposition it.

**Text layers** (type "text"):
- Keep text complete and uncropped first of all.
- Scale proportionally with the ratio between target and original size, then reposition.

**Other layers**:
- Scale and reposition proportionally as the overall design requires.

### 3. Output format
Return one entry per layer:
[
  {{
    "id": "layer id (string, identical to the id in the table)",
    "type": "layer type",
    "original_coords": {{"x": X, "y": Y, "width": W, "height": H}},
    "new_coords": {{"x": X, "y": Y, "width": W, "height": H}}
  }}
]

**Important**:
1. Every "id" must match an input id exactly (case-sensitive, every character).
2. Output the JSON array directly, with no markdown code fences and no surrounding prose.
3. Every layer listed above must appear in the output exactly once.
"#,
        source_w = frame.source_width,
        source_h = frame.source_height,
        target_w = frame.target_width,
        target_h = frame.target_height,
        ids = id_list(elements),
        table = element_table(elements),
    )
}

/// One `- <id>` line per element, in input order
pub fn id_list(elements: &[Element]) -> String {
    elements
        .iter()
        .map(|e| format!("- {}", e.id))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fixed-width table of every element, positions re-based so the group's
/// top-left corner sits at the origin
pub fn element_table(elements: &[Element]) -> String {
    let mut lines = Vec::with_capacity(elements.len() + 2);
    lines.push(row(
        "ID",
        "TYPE",
        "POSITION(left,top,right,bottom)",
        "SIZE(width×height)",
    ));
    lines.push("-".repeat(RULE_WIDTH));

    let min_x = elements.iter().map(|e| e.x).fold(f64::INFINITY, f64::min);
    let min_y = elements.iter().map(|e| e.y).fold(f64::INFINITY, f64::min);

    for element in elements {
        let x = element.x - min_x;
        let y = element.y - min_y;
        let kind: String = element.kind.chars().take(TYPE_WIDTH).collect();
        let position = format!(
            "({:.2}, {:.2}, {:.2}, {:.2})",
            x,
            y,
            x + element.width,
            y + element.height
        );
        let size = format!("{:.0}×{:.0}", element.width, element.height);
        lines.push(row(&element.id, &kind, &position, &size));
    }

    lines.join("\n")
}

fn row(id: &str, kind: &str, position: &str, size: &str) -> String {
    format!(
        "{:<id_w$} {:<type_w$} {:<pos_w$} {:<size_w$}",
        id,
        kind,
        position,
        size,
        id_w = ID_WIDTH,
        type_w = TYPE_WIDTH,
        pos_w = POSITION_WIDTH,
        size_w = SIZE_WIDTH,
    )
    .trim_end()
    .to_string()
}
