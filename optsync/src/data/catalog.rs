//! Built-in descriptor catalog for code editor options.
//!
//! Paths follow the editor widget's option names, so a committed
//! [`ConfigTree`](super::tree::ConfigTree) can be handed to the widget as-is.

use super::descriptor::{AttributeDescriptor, DescriptorList};

/// Default editor settings shown by the settings panel.
pub fn editor_defaults() -> DescriptorList {
    DescriptorList::new(editor_descriptors()).expect("built-in editor catalog is valid")
}

fn editor_descriptors() -> Vec<AttributeDescriptor> {
    vec![
        AttributeDescriptor::enumeration("theme", ["vs", "vs-dark", "hc-black"], "vs")
            .with_description("Color theme of the editor"),
        AttributeDescriptor::integer("fontSize", 14),
        AttributeDescriptor::string("fontFamily", "Menlo, Monaco, \"Courier New\", monospace"),
        AttributeDescriptor::integer("tabSize", 4),
        AttributeDescriptor::boolean("insertSpaces", true),
        AttributeDescriptor::enumeration(
            "wordWrap",
            ["off", "on", "wordWrapColumn", "bounded"],
            "off",
        ),
        AttributeDescriptor::integer("wordWrapColumn", 80)
            .with_description("Column to wrap at when word wrap uses a column"),
        AttributeDescriptor::enumeration(
            "lineNumbers",
            ["on", "off", "relative", "interval"],
            "on",
        ),
        AttributeDescriptor::enumeration(
            "cursorStyle",
            [
                "line",
                "block",
                "underline",
                "line-thin",
                "block-outline",
                "underline-thin",
            ],
            "line",
        ),
        AttributeDescriptor::enumeration(
            "cursorBlinking",
            ["blink", "smooth", "phase", "expand", "solid"],
            "blink",
        ),
        AttributeDescriptor::enumeration(
            "renderWhitespace",
            ["none", "boundary", "selection", "all"],
            "none",
        ),
        AttributeDescriptor::boolean("minimap.enabled", true),
        AttributeDescriptor::enumeration("minimap.side", ["right", "left"], "right"),
        AttributeDescriptor::boolean("scrollBeyondLastLine", true),
        AttributeDescriptor::boolean("folding", true),
        AttributeDescriptor::boolean("mouseWheelZoom", false),
        AttributeDescriptor::boolean("readOnly", false),
    ]
}
