//! Read back a produced presentation package.
//!
//! [`PackageSummary`] walks the package the same way a presentation reader
//! does: `presentation.xml` gives slide order, relationships lead to each
//! slide's layout and notes, and the shape trees carry text and colours.

use crate::constants::{
    BODY_SHAPE_NAME, HEADER_BAR_NAME, REL_TYPE_NOTES_SLIDE, REL_TYPE_SLIDE_LAYOUT,
    TITLE_SHAPE_NAME,
};
use crate::error::{ExportError, Result};
use crate::layout::Rect;
use crate::slide::SlideTransition;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use tracing::debug;
use zip::ZipArchive;

/// What a reader sees in a package
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageSummary {
    /// Document title from the core properties
    pub title: String,

    /// Slide width in EMU
    pub slide_width: i64,

    /// Slide height in EMU
    pub slide_height: i64,

    /// Fill of the master's header bar
    pub header_color: Option<String>,

    /// Master background fill
    pub background_color: Option<String>,

    /// Files under `ppt/media/`
    pub media: Vec<String>,

    /// Slides in presentation order
    pub slides: Vec<SlideSummary>,
}

/// Visible content of one slide
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlideSummary {
    /// Part name, e.g. `ppt/slides/slide1.xml`
    pub part: String,

    /// Slide identifier, carried as the slide's `cSld` name
    pub id: String,

    /// Name of the slide layout the slide is bound to
    pub layout: String,

    pub title: String,
    pub title_color: Option<String>,

    /// Bulleted paragraphs, in order
    pub bullets: Vec<String>,
    pub bullet_color: Option<String>,
    pub text_color: Option<String>,

    /// Placed picture frames
    pub pictures: Vec<Rect>,

    /// Whether the slide has a picture background
    pub background_image: bool,

    pub transition: SlideTransition,

    /// Speaker notes, empty when the slide has none
    pub notes: String,
}

impl PackageSummary {
    /// Summarize a package held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;

        let presentation = read_part(&mut archive, "ppt/presentation.xml")?;
        let (slide_rids, slide_width, slide_height) = parse_presentation(&presentation)?;

        let presentation_rels = parse_rels(&read_part(
            &mut archive,
            "ppt/_rels/presentation.xml.rels",
        )?)?;
        let targets: HashMap<&str, &str> = presentation_rels
            .iter()
            .map(|r| (r.id.as_str(), r.target.as_str()))
            .collect();

        let master = parse_shape_tree(&read_part(
            &mut archive,
            "ppt/slideMasters/slideMaster1.xml",
        )?)?;
        let header_color = master
            .shapes
            .iter()
            .find(|s| s.name == HEADER_BAR_NAME)
            .and_then(|s| s.fill.clone());

        let mut slides = Vec::with_capacity(slide_rids.len());
        for rid in &slide_rids {
            let target = targets.get(rid.as_str()).ok_or_else(|| {
                ExportError::invalid_package(format!("slide relationship '{}' is missing", rid))
            })?;
            let part = resolve_target("ppt/presentation.xml", target);
            slides.push(read_slide(&mut archive, part)?);
        }

        let title = match archive.by_name("docProps/core.xml") {
            Ok(mut file) => {
                let mut contents = String::new();
                file.read_to_string(&mut contents)?;
                parse_core_title(&contents)?
            }
            Err(_) => String::new(),
        };

        let media = archive
            .file_names()
            .filter(|name| name.starts_with("ppt/media/"))
            .map(str::to_string)
            .collect::<Vec<_>>();

        debug!(slides = slides.len(), media = media.len(), "Package inspected");

        Ok(Self {
            title,
            slide_width,
            slide_height,
            header_color,
            background_color: master.background_color,
            media,
            slides,
        })
    }

    /// Summarize a package on disk
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_bytes(&bytes)
    }

    /// Number of slides
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }
}

fn read_slide<R: Read + Seek>(archive: &mut ZipArchive<R>, part: String) -> Result<SlideSummary> {
    let tree = parse_shape_tree(&read_part(archive, &part)?)?;

    let rels = match archive.by_name(&rels_path_for(&part)) {
        Ok(mut file) => {
            let mut contents = String::new();
            file.read_to_string(&mut contents)?;
            parse_rels(&contents)?
        }
        Err(_) => Vec::new(),
    };

    let mut layout = String::new();
    let mut notes = String::new();

    for rel in &rels {
        let target = resolve_target(&part, &rel.target);

        if rel.rel_type == REL_TYPE_SLIDE_LAYOUT {
            let layout_tree = parse_shape_tree(&read_part(archive, &target)?)?;
            layout = layout_tree.name.unwrap_or_default();
        } else if rel.rel_type == REL_TYPE_NOTES_SLIDE {
            let notes_tree = parse_shape_tree(&read_part(archive, &target)?)?;
            if let Some(body) = notes_tree
                .shapes
                .iter()
                .find(|s| s.placeholder.as_deref() == Some("body"))
            {
                notes = body.text();
            }
        }
    }

    let title_shape = tree.shapes.iter().find(|s| s.name == TITLE_SHAPE_NAME);
    let body_shape = tree.shapes.iter().find(|s| s.name == BODY_SHAPE_NAME);
    let bullets: Vec<&Paragraph> = body_shape
        .map(|s| s.paragraphs.iter().filter(|p| p.bullet).collect())
        .unwrap_or_default();

    Ok(SlideSummary {
        id: tree.name.clone().unwrap_or_default(),
        layout,
        title: title_shape.map(Shape::text).unwrap_or_default(),
        title_color: title_shape
            .and_then(|s| s.paragraphs.first())
            .and_then(|p| p.run_color.clone()),
        bullet_color: bullets.first().and_then(|p| p.bullet_color.clone()),
        text_color: bullets.first().and_then(|p| p.run_color.clone()),
        bullets: bullets.iter().map(|p| p.text.clone()).collect(),
        pictures: tree
            .shapes
            .iter()
            .filter(|s| s.picture)
            .filter_map(|s| s.frame)
            .collect(),
        background_image: tree.background_picture,
        transition: tree.transition.unwrap_or(SlideTransition::None),
        notes,
        part,
    })
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String> {
    let mut file = archive
        .by_name(name)
        .map_err(|_| ExportError::invalid_package(format!("missing part '{}'", name)))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Resolve a relationship target against the part that owns it
fn resolve_target(part: &str, target: &str) -> String {
    let mut segments: Vec<&str> = part.split('/').collect();
    segments.pop();

    for segment in target.split('/') {
        match segment {
            ".." => {
                segments.pop();
            }
            "." | "" => {}
            s => segments.push(s),
        }
    }

    segments.join("/")
}

/// `ppt/slides/slide1.xml` -> `ppt/slides/_rels/slide1.xml.rels`
fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| std::str::from_utf8(&a.value).ok().map(str::to_string))
}

/// Slide relationship ids in order, plus slide size
fn parse_presentation(xml: &str) -> Result<(Vec<String>, i64, i64)> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut rids = Vec::new();
    let mut width = 0i64;
    let mut height = 0i64;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"sldId" => {
                    if let Some(rid) = attr(e, b"r:id") {
                        rids.push(rid);
                    }
                }
                b"sldSz" => {
                    width = attr(e, b"cx").and_then(|v| v.parse().ok()).unwrap_or(width);
                    height = attr(e, b"cy").and_then(|v| v.parse().ok()).unwrap_or(height);
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExportError::XmlError(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok((rids, width, height))
}

struct Relationship {
    id: String,
    rel_type: String,
    target: String,
}

fn parse_rels(xml: &str) -> Result<Vec<Relationship>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut rels = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                if let (Some(id), Some(rel_type), Some(target)) =
                    (attr(e, b"Id"), attr(e, b"Type"), attr(e, b"Target"))
                {
                    rels.push(Relationship {
                        id,
                        rel_type,
                        target,
                    });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExportError::XmlError(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

fn parse_core_title(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);

    let mut buf = Vec::new();
    let mut in_title = false;
    let mut title = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"title" => in_title = true,
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"title" => in_title = false,
            Ok(Event::Text(ref e)) if in_title => {
                let text = e
                    .unescape()
                    .map_err(|err| ExportError::invalid_package(err.to_string()))?;
                title.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExportError::XmlError(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(title)
}

#[derive(Debug, Default)]
struct Paragraph {
    text: String,
    bullet: bool,
    bullet_color: Option<String>,
    run_color: Option<String>,
}

#[derive(Debug, Default)]
struct Shape {
    name: String,
    placeholder: Option<String>,
    picture: bool,
    fill: Option<String>,
    frame: Option<Rect>,
    paragraphs: Vec<Paragraph>,
}

impl Shape {
    fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Flattened view of a slide, layout, master or notes part
#[derive(Debug, Default)]
struct ShapeTree {
    /// `cSld` name
    name: Option<String>,
    background_color: Option<String>,
    background_picture: bool,
    shapes: Vec<Shape>,
    transition: Option<SlideTransition>,
}

#[derive(Default)]
struct TreeParser {
    tree: ShapeTree,
    shape: Option<Shape>,
    paragraph: Option<Paragraph>,
    in_bg: bool,
    in_sp_pr: bool,
    in_xfrm: bool,
    in_bu_clr: bool,
    in_run_props: bool,
    in_text: bool,
    in_transition: bool,
}

impl TreeParser {
    fn open(&mut self, e: &BytesStart<'_>, is_start: bool) {
        match e.local_name().as_ref() {
            b"cSld" => self.tree.name = attr(e, b"name"),
            b"bg" => self.in_bg = is_start,
            b"blip" if self.in_bg => self.tree.background_picture = true,
            b"sp" => {
                self.shape = Some(Shape::default());
            }
            b"pic" => {
                self.shape = Some(Shape {
                    picture: true,
                    ..Shape::default()
                });
            }
            b"cNvPr" => {
                if let Some(shape) = self.shape.as_mut() {
                    shape.name = attr(e, b"name").unwrap_or_default();
                }
            }
            b"ph" => {
                if let Some(shape) = self.shape.as_mut() {
                    shape.placeholder = Some(attr(e, b"type").unwrap_or_else(|| "obj".to_string()));
                }
            }
            b"spPr" => self.in_sp_pr = is_start,
            b"xfrm" => self.in_xfrm = is_start && self.in_sp_pr,
            b"off" if self.in_xfrm => {
                if let Some(shape) = self.shape.as_mut() {
                    let frame = shape.frame.get_or_insert(Rect::new(0, 0, 0, 0));
                    frame.x = attr(e, b"x").and_then(|v| v.parse().ok()).unwrap_or(0);
                    frame.y = attr(e, b"y").and_then(|v| v.parse().ok()).unwrap_or(0);
                }
            }
            b"ext" if self.in_xfrm => {
                if let Some(shape) = self.shape.as_mut() {
                    let frame = shape.frame.get_or_insert(Rect::new(0, 0, 0, 0));
                    frame.cx = attr(e, b"cx").and_then(|v| v.parse().ok()).unwrap_or(0);
                    frame.cy = attr(e, b"cy").and_then(|v| v.parse().ok()).unwrap_or(0);
                }
            }
            b"p" => {
                self.paragraph = Some(Paragraph::default());
            }
            b"buChar" => {
                if let Some(p) = self.paragraph.as_mut() {
                    p.bullet = true;
                }
            }
            b"buClr" => self.in_bu_clr = is_start,
            b"rPr" | b"endParaRPr" => self.in_run_props = is_start,
            b"t" => self.in_text = is_start,
            b"br" => {
                if let Some(p) = self.paragraph.as_mut() {
                    p.text.push('\n');
                }
            }
            b"srgbClr" => self.color(attr(e, b"val")),
            b"transition" => self.in_transition = is_start,
            name if self.in_transition => {
                if let Some(effect) = std::str::from_utf8(name)
                    .ok()
                    .and_then(SlideTransition::from_ooxml_element)
                {
                    self.tree.transition = Some(effect);
                }
            }
            _ => {}
        }
    }

    fn color(&mut self, value: Option<String>) {
        let Some(value) = value else {
            return;
        };

        if self.in_bu_clr {
            if let Some(p) = self.paragraph.as_mut() {
                p.bullet_color = Some(value);
            }
        } else if self.in_run_props {
            if let Some(p) = self.paragraph.as_mut() {
                p.run_color.get_or_insert(value);
            }
        } else if self.in_bg && self.shape.is_none() {
            self.tree.background_color.get_or_insert(value);
        } else if self.in_sp_pr {
            if let Some(shape) = self.shape.as_mut() {
                shape.fill.get_or_insert(value);
            }
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_text {
            if let Some(p) = self.paragraph.as_mut() {
                p.text.push_str(text);
            }
        }
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"bg" => self.in_bg = false,
            b"sp" | b"pic" => {
                if let Some(shape) = self.shape.take() {
                    self.tree.shapes.push(shape);
                }
            }
            b"spPr" => self.in_sp_pr = false,
            b"xfrm" => self.in_xfrm = false,
            b"p" => {
                if let (Some(paragraph), Some(shape)) = (self.paragraph.take(), self.shape.as_mut()) {
                    shape.paragraphs.push(paragraph);
                }
            }
            b"buClr" => self.in_bu_clr = false,
            b"rPr" | b"endParaRPr" => self.in_run_props = false,
            b"t" => self.in_text = false,
            b"transition" => self.in_transition = false,
            _ => {}
        }
    }
}

fn parse_shape_tree(xml: &str) -> Result<ShapeTree> {
    // Text inside <a:t> is significant, so no trimming
    let mut reader = Reader::from_str(xml);

    let mut buf = Vec::new();
    let mut parser = TreeParser::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => parser.open(e, true),
            Ok(Event::Empty(ref e)) => parser.open(e, false),
            Ok(Event::End(ref e)) => parser.close(e.local_name().as_ref()),
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| ExportError::invalid_package(err.to_string()))?;
                parser.text(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExportError::XmlError(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(parser.tree)
}
