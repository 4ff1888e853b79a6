//! XML story reports.
//!
//! One document per story:
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <story name="LoginStory" path="app/LoginStory">
//!     <inOrderTo>...</inOrderTo>
//!     <iWantTo>...</iWantTo>
//!     <asA>...</asA>
//!     <scenario title="...">
//!         <step name="..." type="Given" state="success">
//!             <table>
//!                 <row>
//!                     <entry name="header">value</entry>
//!                 </row>
//!             </table>
//!         </step>
//!     </scenario>
//! </story>
//! ```

use std::fmt::{self, Write};

use inline_gherkin_table::{Row, Table};

use super::report::{ReportFormat, ReportListener, ScenarioReport, StepReport, StoryReport};
use crate::error::ReportError;

const INDENT: &str = "    ";

/// Renders story reports as XML.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlFormat;

/// Writes one `<story name>.xml` report per finished story.
pub type XmlListener = ReportListener<XmlFormat>;

impl ReportFormat for XmlFormat {
    fn extension(&self) -> &'static str {
        "xml"
    }

    fn render(&self, story: &StoryReport) -> Result<String, ReportError> {
        let mut output = String::new();
        write(&mut output, story)?;
        Ok(output)
    }
}

/// Render a story report as an XML document.
///
/// # Errors
///
/// Returns an error if writing to `writer` fails.
pub(crate) fn write<W: Write>(writer: &mut W, story: &StoryReport) -> fmt::Result {
    writer.write_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n")?;
    writer.write_str("<story name=\"")?;
    write_escaped(writer, story.id().name())?;
    writer.write_str("\" path=\"")?;
    write_escaped(writer, story.id().path())?;
    writer.write_str("\">\n")?;
    if let Some(narrative) = story.narrative() {
        write_text_element(writer, 1, "inOrderTo", &narrative.in_order_to)?;
        write_text_element(writer, 1, "iWantTo", &narrative.i_want_to)?;
        write_text_element(writer, 1, "asA", &narrative.as_a)?;
    }
    for scenario in story.scenarios() {
        write_scenario(writer, scenario)?;
    }
    writer.write_str("</story>\n")
}

fn write_scenario<W: Write>(writer: &mut W, scenario: &ScenarioReport) -> fmt::Result {
    indent(writer, 1)?;
    writer.write_str("<scenario title=\"")?;
    write_escaped(writer, scenario.title())?;
    writer.write_str("\">\n")?;
    for step in scenario.steps() {
        write_step(writer, step)?;
    }
    if let Some(failure) = scenario.failure() {
        write_text_element(writer, 2, "failure", failure)?;
    }
    indent(writer, 1)?;
    writer.write_str("</scenario>\n")
}

fn write_step<W: Write>(writer: &mut W, step: &StepReport) -> fmt::Result {
    indent(writer, 2)?;
    writer.write_str("<step name=\"")?;
    write_escaped(writer, step.name())?;
    write!(
        writer,
        "\" type=\"{}\" state=\"{}\"",
        step.keyword(),
        step.state().as_str()
    )?;
    if step.table().is_none() && step.failure().is_none() {
        return writer.write_str(" />\n");
    }
    writer.write_str(">\n")?;
    if let Some(table) = step.table() {
        write_table(writer, table)?;
    }
    if let Some(failure) = step.failure() {
        write_text_element(writer, 3, "failure", failure)?;
    }
    indent(writer, 2)?;
    writer.write_str("</step>\n")
}

fn write_table<W: Write>(writer: &mut W, table: &Table<Row>) -> fmt::Result {
    indent(writer, 3)?;
    writer.write_str("<table>\n")?;
    for row in table {
        indent(writer, 4)?;
        writer.write_str("<row>\n")?;
        for (name, value) in row.iter() {
            indent(writer, 5)?;
            writer.write_str("<entry name=\"")?;
            write_escaped(writer, name)?;
            writer.write_str("\">")?;
            write_escaped(writer, value)?;
            writer.write_str("</entry>\n")?;
        }
        indent(writer, 4)?;
        writer.write_str("</row>\n")?;
    }
    indent(writer, 3)?;
    writer.write_str("</table>\n")
}

fn write_text_element<W: Write>(
    writer: &mut W,
    depth: usize,
    element: &str,
    text: &str,
) -> fmt::Result {
    indent(writer, depth)?;
    write!(writer, "<{element}>")?;
    write_escaped(writer, text)?;
    writeln!(writer, "</{element}>")
}

fn indent<W: Write>(writer: &mut W, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        writer.write_str(INDENT)?;
    }
    Ok(())
}

fn write_escaped<W: Write>(writer: &mut W, value: &str) -> fmt::Result {
    const INVALID_REPLACEMENT: &str = "&#xFFFD;";
    for character in value.chars() {
        if !is_valid_xml_character(character) {
            writer.write_str(INVALID_REPLACEMENT)?;
            continue;
        }
        match character {
            '&' => writer.write_str("&amp;")?,
            '<' => writer.write_str("&lt;")?,
            '>' => writer.write_str("&gt;")?,
            '"' => writer.write_str("&quot;")?,
            '\'' => writer.write_str("&apos;")?,
            other => writer.write_char(other)?,
        }
    }
    Ok(())
}

fn is_valid_xml_character(character: char) -> bool {
    matches!(
        u32::from(character),
        0x09 | 0x0A | 0x0D | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x1_0000..=0x10_FFFF
    )
}
