//! PPTX generation from a slide snapshot.
//!
//! The writer is stateless across calls: each [`PptxWriter::write`] builds
//! its own archive in memory from the slides, theme and title it is given.

use crate::config::ExportConfig;
use crate::constants::*;
use crate::error::{AssetError, ExportError, ImageSlot, Result};
use crate::layout::{self, Rect, SlideLayout, LAYOUT_NAMES};
use crate::media::{EmbeddedImage, ImageKind};
use crate::slide::Slide;
use crate::theme::{resolve_theme, Theme};
use std::io::{Cursor, Seek, Write};
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Bullet glyph (U+2022)
const BULLET_CHAR: char = '\u{2022}';

/// Bullet hanging indent in EMU (0.375in)
const BULLET_INDENT_EMU: i64 = 342_900;

/// Number of fixed relationships in `presentation.xml.rels` before slides
const FIXED_PRESENTATION_RELS: usize = 5;

/// PPTX deck writer
#[derive(Debug, Clone, Default)]
pub struct PptxWriter {
    /// Metadata, typography and image limits
    config: ExportConfig,
}

/// Result of a successful serialization
#[derive(Debug, Clone)]
pub struct ExportedDeck {
    /// The complete package
    pub bytes: Vec<u8>,

    /// Images that could not be embedded, in slide order
    pub asset_errors: Vec<AssetError>,

    /// Number of slides written
    pub slide_count: usize,
}

/// A slide with its images resolved and layout decided
struct PreparedSlide<'a> {
    /// 1-based slide number
    number: usize,

    slide: &'a Slide,

    layout: SlideLayout,

    background: Option<EmbeddedImage>,

    notes: Option<&'a str>,

    /// Media part names (e.g. "image3.png")
    image_part: Option<String>,
    background_part: Option<String>,
}

/// Relationship list for a single part
struct PartRels {
    entries: Vec<(String, &'static str, String)>,
}

impl PartRels {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a relationship and return its id
    fn push(&mut self, rel_type: &'static str, target: impl Into<String>) -> String {
        let id = format!("rId{}", self.entries.len() + 1);
        self.entries.push((id.clone(), rel_type, target.into()));
        id
    }

    fn to_xml(&self) -> String {
        let mut xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<Relationships xmlns=\"{}\">\n",
            NS_PACKAGE_RELATIONSHIPS
        );
        for (id, rel_type, target) in &self.entries {
            xml.push_str(&format!(
                "  <Relationship Id=\"{}\" Type=\"{}\" Target=\"{}\"/>\n",
                id, rel_type, target
            ));
        }
        xml.push_str("</Relationships>");
        xml
    }
}

impl PptxWriter {
    /// Create a writer with the given configuration
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// The active configuration
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Serialize `slides` with the theme named `theme_id`.
    ///
    /// Fails on an unknown theme or an empty slide list. Images that cannot
    /// be embedded do not fail the call; they are listed in
    /// [`ExportedDeck::asset_errors`].
    pub fn write(&self, slides: &[Slide], theme_id: &str, title: &str) -> Result<ExportedDeck> {
        let theme = resolve_theme(theme_id)?;
        self.write_with_theme(slides, theme, title)
    }

    /// Serialize `slides` with an already-resolved theme
    pub fn write_with_theme(
        &self,
        slides: &[Slide],
        theme: &Theme,
        title: &str,
    ) -> Result<ExportedDeck> {
        if slides.is_empty() {
            return Err(ExportError::EmptyDeck);
        }

        let mut asset_errors = Vec::new();
        let prepared = self.prepare_slides(slides, &mut asset_errors);
        let has_notes = prepared.iter().any(|s| s.notes.is_some());

        let cursor = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(cursor);

        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        self.write_content_types(&mut zip, options, &prepared)?;
        self.write_root_rels(&mut zip, options)?;
        self.write_app_xml(&mut zip, options, &prepared)?;
        self.write_core_xml(&mut zip, options, title)?;
        self.write_presentation_xml(&mut zip, options, prepared.len(), has_notes)?;
        self.write_presentation_rels(&mut zip, options, prepared.len(), has_notes)?;
        self.write_pres_props(&mut zip, options)?;
        self.write_table_styles(&mut zip, options)?;
        self.write_view_props(&mut zip, options)?;
        self.write_theme(&mut zip, options, "theme1.xml", theme)?;
        self.write_slide_master(&mut zip, options, theme)?;
        self.write_slide_layouts(&mut zip, options)?;

        if has_notes {
            self.write_theme(&mut zip, options, "theme2.xml", theme)?;
            self.write_notes_master(&mut zip, options)?;
        }

        for slide in &prepared {
            self.write_slide(&mut zip, options, slide, theme)?;

            if let Some(notes) = slide.notes {
                self.write_notes_slide(&mut zip, options, slide.number, notes)?;
            }
        }

        // Media files, stored verbatim
        for slide in &prepared {
            if let (Some(name), Some((image, _))) = (&slide.image_part, slide.layout.picture()) {
                zip.start_file(format!("ppt/media/{}", name), options)?;
                zip.write_all(&image.data)?;
            }
            if let (Some(name), Some(image)) = (&slide.background_part, &slide.background) {
                zip.start_file(format!("ppt/media/{}", name), options)?;
                zip.write_all(&image.data)?;
            }
        }

        let cursor = zip.finish()?;
        let bytes = cursor.into_inner();

        info!(
            slides = prepared.len(),
            bytes = bytes.len(),
            skipped_images = asset_errors.len(),
            theme = %theme.id,
            "Deck serialized"
        );

        Ok(ExportedDeck {
            bytes,
            asset_errors,
            slide_count: prepared.len(),
        })
    }

    /// Probe images and fix each slide's layout, in input order
    fn prepare_slides<'a>(
        &self,
        slides: &'a [Slide],
        asset_errors: &mut Vec<AssetError>,
    ) -> Vec<PreparedSlide<'a>> {
        let max_bytes = self.config.images.max_bytes;
        let mut media_count = 0;

        let mut probe = |index: usize, slide: &Slide, slot: ImageSlot, bytes: Option<&[u8]>| {
            let bytes = bytes?;
            match EmbeddedImage::probe(bytes, max_bytes) {
                Ok(image) => Some(image),
                Err(err) => {
                    let error = AssetError {
                        slide_index: index,
                        slide_id: slide.id.clone(),
                        slot,
                        reason: err.to_string(),
                    };
                    warn!(slide = index + 1, id = %slide.id, %slot, error = %err, "Image skipped");
                    asset_errors.push(error);
                    None
                }
            }
        };

        let mut prepared = Vec::with_capacity(slides.len());

        for (index, slide) in slides.iter().enumerate() {
            let background = probe(index, slide, ImageSlot::Background, slide.background_bytes());
            let image = probe(index, slide, ImageSlot::Image, slide.image_bytes());
            let layout = SlideLayout::select(image);

            let mut next_media_name = |kind: ImageKind| {
                media_count += 1;
                format!("image{}.{}", media_count, kind.extension())
            };

            let background_part = background.as_ref().map(|b| next_media_name(b.kind));
            let image_part = layout.picture().map(|(image, _)| next_media_name(image.kind));

            debug!(
                slide = index + 1,
                id = %slide.id,
                layout = layout.name(),
                bullets = slide.bullets.len(),
                "Slide prepared"
            );

            prepared.push(PreparedSlide {
                number: index + 1,
                slide,
                layout,
                background,
                notes: slide.notes(),
                image_part,
                background_part,
            });
        }

        prepared
    }

    /// Write [Content_Types].xml
    fn write_content_types<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
        slides: &[PreparedSlide<'_>],
    ) -> Result<()> {
        zip.start_file("[Content_Types].xml", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
"#,
        );

        for kind in ImageKind::ALL {
            content.push_str(&format!(
                "  <Default Extension=\"{}\" ContentType=\"{}\"/>\n",
                kind.extension(),
                kind.content_type()
            ));
        }

        content.push_str(
            r#"  <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
  <Override PartName="/ppt/presProps.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presProps+xml"/>
  <Override PartName="/ppt/tableStyles.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.tableStyles+xml"/>
  <Override PartName="/ppt/viewProps.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.viewProps+xml"/>
  <Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>
  <Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>
  <Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>
  <Override PartName="/ppt/slideLayouts/slideLayout2.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>
  <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
  <Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
"#,
        );

        if slides.iter().any(|s| s.notes.is_some()) {
            content.push_str(
                r#"  <Override PartName="/ppt/theme/theme2.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>
  <Override PartName="/ppt/notesMasters/notesMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.notesMaster+xml"/>
"#,
            );
        }

        for slide in slides {
            content.push_str(&format!(
                "  <Override PartName=\"/ppt/slides/slide{}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slide+xml\"/>\n",
                slide.number
            ));

            if slide.notes.is_some() {
                content.push_str(&format!(
                    "  <Override PartName=\"/ppt/notesSlides/notesSlide{}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.notesSlide+xml\"/>\n",
                    slide.number
                ));
            }
        }

        content.push_str("</Types>");

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write _rels/.rels
    fn write_root_rels<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> Result<()> {
        zip.start_file("_rels/.rels", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
</Relationships>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write docProps/app.xml
    fn write_app_xml<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
        slides: &[PreparedSlide<'_>],
    ) -> Result<()> {
        zip.start_file("docProps/app.xml", options)?;

        let notes = slides.iter().filter(|s| s.notes.is_some()).count();
        let paragraphs: usize = slides.iter().map(|s| s.slide.bullets.len()).sum();

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
  <TotalTime>0</TotalTime>
  <Words>0</Words>
  <Application>{}</Application>
  <PresentationFormat>On-screen Show (16:9)</PresentationFormat>
  <Paragraphs>{}</Paragraphs>
  <Slides>{}</Slides>
  <Notes>{}</Notes>
  <HiddenSlides>0</HiddenSlides>
  <MMClips>0</MMClips>
  <ScaleCrop>false</ScaleCrop>
  <Company>{}</Company>
  <LinksUpToDate>false</LinksUpToDate>
  <SharedDoc>false</SharedDoc>
  <HyperlinksChanged>false</HyperlinksChanged>
  <AppVersion>16.0000</AppVersion>
</Properties>"#,
            APPLICATION_NAME,
            paragraphs,
            slides.len(),
            notes,
            escape_xml(&self.config.meta.company)
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write docProps/core.xml
    fn write_core_xml<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
        title: &str,
    ) -> Result<()> {
        zip.start_file("docProps/core.xml", options)?;

        let author = &self.config.meta.author;
        let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <dc:title>{}</dc:title>
  <dc:creator>{}</dc:creator>
  <cp:lastModifiedBy>{}</cp:lastModifiedBy>
  <cp:revision>1</cp:revision>
  <dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>
  <dcterms:modified xsi:type="dcterms:W3CDTF">{}</dcterms:modified>
</cp:coreProperties>"#,
            escape_xml(title),
            escape_xml(author),
            escape_xml(author),
            now,
            now
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write ppt/presentation.xml
    fn write_presentation_xml<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
        slide_count: usize,
        has_notes: bool,
    ) -> Result<()> {
        zip.start_file("ppt/presentation.xml", options)?;

        let notes_master = if has_notes {
            format!(
                "  <p:notesMasterIdLst>\n    <p:notesMasterId r:id=\"rId{}\"/>\n  </p:notesMasterIdLst>\n",
                FIXED_PRESENTATION_RELS + slide_count + 1
            )
        } else {
            String::new()
        };

        let mut slide_refs = String::new();
        for i in 1..=slide_count {
            slide_refs.push_str(&format!(
                "    <p:sldId id=\"{}\" r:id=\"rId{}\"/>\n",
                255 + i,
                FIXED_PRESENTATION_RELS + i
            ));
        }

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">
  <p:sldMasterIdLst>
    <p:sldMasterId id="2147483648" r:id="rId1"/>
  </p:sldMasterIdLst>
{}  <p:sldIdLst>
{}  </p:sldIdLst>
  <p:sldSz cx="{}" cy="{}"/>
  <p:notesSz cx="{}" cy="{}"/>
</p:presentation>"#,
            NS_DRAWING,
            NS_RELATIONSHIPS,
            NS_PRESENTATION,
            notes_master,
            slide_refs,
            SLIDE_WIDTH_EMU,
            SLIDE_HEIGHT_EMU,
            NOTES_WIDTH_EMU,
            NOTES_HEIGHT_EMU
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write ppt/_rels/presentation.xml.rels
    fn write_presentation_rels<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
        slide_count: usize,
        has_notes: bool,
    ) -> Result<()> {
        zip.start_file("ppt/_rels/presentation.xml.rels", options)?;

        let mut rels = PartRels::new();
        rels.push(REL_TYPE_SLIDE_MASTER, "slideMasters/slideMaster1.xml");
        rels.push(REL_TYPE_PRES_PROPS, "presProps.xml");
        rels.push(REL_TYPE_VIEW_PROPS, "viewProps.xml");
        rels.push(REL_TYPE_THEME, "theme/theme1.xml");
        rels.push(REL_TYPE_TABLE_STYLES, "tableStyles.xml");

        for i in 1..=slide_count {
            rels.push(REL_TYPE_SLIDE, format!("slides/slide{}.xml", i));
        }

        if has_notes {
            rels.push(REL_TYPE_NOTES_MASTER, "notesMasters/notesMaster1.xml");
        }

        zip.write_all(rels.to_xml().as_bytes())?;
        Ok(())
    }

    /// Write ppt/presProps.xml
    fn write_pres_props<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> Result<()> {
        zip.start_file("ppt/presProps.xml", options)?;

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentationPr xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"/>"#,
            NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write ppt/tableStyles.xml
    fn write_table_styles<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> Result<()> {
        zip.start_file("ppt/tableStyles.xml", options)?;

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:tblStyleLst xmlns:a="{}" def="{{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}}"/>"#,
            NS_DRAWING
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write ppt/viewProps.xml
    fn write_view_props<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> Result<()> {
        zip.start_file("ppt/viewProps.xml", options)?;

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:viewPr xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">
  <p:normalViewPr>
    <p:restoredLeft sz="15620"/>
    <p:restoredTop sz="94660"/>
  </p:normalViewPr>
  <p:slideViewPr>
    <p:cSldViewPr>
      <p:cViewPr>
        <p:scale>
          <a:sx n="100" d="100"/>
          <a:sy n="100" d="100"/>
        </p:scale>
        <p:origin x="0" y="0"/>
      </p:cViewPr>
    </p:cSldViewPr>
  </p:slideViewPr>
</p:viewPr>"#,
            NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write ppt/theme/<file>, folding the palette into the colour scheme
    fn write_theme<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
        file_name: &str,
        theme: &Theme,
    ) -> Result<()> {
        zip.start_file(format!("ppt/theme/{}", file_name), options)?;

        let name = theme.display_name();
        let font = escape_xml(&self.config.text.font_face);

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="{ns}" name="{name}">
  <a:themeElements>
    <a:clrScheme name="{name}">
      <a:dk1><a:srgbClr val="{text}"/></a:dk1>
      <a:lt1><a:srgbClr val="{bg}"/></a:lt1>
      <a:dk2><a:srgbClr val="{header}"/></a:dk2>
      <a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>
      <a:accent1><a:srgbClr val="{accent}"/></a:accent1>
      <a:accent2><a:srgbClr val="ED7D31"/></a:accent2>
      <a:accent3><a:srgbClr val="A5A5A5"/></a:accent3>
      <a:accent4><a:srgbClr val="FFC000"/></a:accent4>
      <a:accent5><a:srgbClr val="5B9BD5"/></a:accent5>
      <a:accent6><a:srgbClr val="70AD47"/></a:accent6>
      <a:hlink><a:srgbClr val="0563C1"/></a:hlink>
      <a:folHlink><a:srgbClr val="954F72"/></a:folHlink>
    </a:clrScheme>
    <a:fontScheme name="{name}">
      <a:majorFont>
        <a:latin typeface="{font}"/>
        <a:ea typeface=""/>
        <a:cs typeface=""/>
      </a:majorFont>
      <a:minorFont>
        <a:latin typeface="{font}"/>
        <a:ea typeface=""/>
        <a:cs typeface=""/>
      </a:minorFont>
    </a:fontScheme>
    <a:fmtScheme name="{name}">
      <a:fillStyleLst>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
      </a:fillStyleLst>
      <a:lnStyleLst>
        <a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
        <a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
        <a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
      </a:lnStyleLst>
      <a:effectStyleLst>
        <a:effectStyle><a:effectLst/></a:effectStyle>
        <a:effectStyle><a:effectLst/></a:effectStyle>
        <a:effectStyle><a:effectLst/></a:effectStyle>
      </a:effectStyleLst>
      <a:bgFillStyleLst>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
      </a:bgFillStyleLst>
    </a:fmtScheme>
  </a:themeElements>
</a:theme>"#,
            ns = NS_DRAWING,
            name = name,
            text = theme.text,
            bg = theme.bg,
            header = theme.header,
            accent = theme.accent,
            font = font,
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write ppt/slideMasters/slideMaster1.xml.
    ///
    /// The master carries the solid background and the header bar; slides
    /// inherit both.
    fn write_slide_master<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
        theme: &Theme,
    ) -> Result<()> {
        zip.start_file("ppt/slideMasters/slideMaster1.xml", options)?;

        let text = &self.config.text;

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldMaster xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">
  <p:cSld>
    <p:bg>
      <p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr>
    </p:bg>
    <p:spTree>
      <p:nvGrpSpPr>
        <p:cNvPr id="1" name=""/>
        <p:cNvGrpSpPr/>
        <p:nvPr/>
      </p:nvGrpSpPr>
      <p:grpSpPr/>
      <p:sp>
        <p:nvSpPr>
          <p:cNvPr id="2" name="{}"/>
          <p:cNvSpPr/>
          <p:nvPr userDrawn="1"/>
        </p:nvSpPr>
        <p:spPr>{}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:ln><a:noFill/></a:ln></p:spPr>
      </p:sp>
    </p:spTree>
  </p:cSld>
  <p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>
  <p:sldLayoutIdLst>
    <p:sldLayoutId id="2147483649" r:id="rId1"/>
    <p:sldLayoutId id="2147483650" r:id="rId2"/>
  </p:sldLayoutIdLst>
  <p:txStyles>
    <p:titleStyle><a:lvl1pPr><a:defRPr sz="{}" b="1"/></a:lvl1pPr></p:titleStyle>
    <p:bodyStyle><a:lvl1pPr><a:defRPr sz="{}"/></a:lvl1pPr></p:bodyStyle>
    <p:otherStyle><a:lvl1pPr><a:defRPr/></a:lvl1pPr></p:otherStyle>
  </p:txStyles>
</p:sldMaster>"#,
            NS_DRAWING,
            NS_RELATIONSHIPS,
            NS_PRESENTATION,
            theme.bg,
            HEADER_BAR_NAME,
            layout::header_bar().to_xfrm(),
            theme.header,
            text.title_size * 100,
            text.body_size * 100
        );

        zip.write_all(content.as_bytes())?;

        // Write slide master rels
        zip.start_file("ppt/slideMasters/_rels/slideMaster1.xml.rels", options)?;

        let mut rels = PartRels::new();
        for i in 1..=LAYOUT_NAMES.len() {
            rels.push(
                REL_TYPE_SLIDE_LAYOUT,
                format!("../slideLayouts/slideLayout{}.xml", i),
            );
        }
        rels.push(REL_TYPE_THEME, "../theme/theme1.xml");

        zip.write_all(rels.to_xml().as_bytes())?;
        Ok(())
    }

    /// Write ppt/slideLayouts/slideLayoutN.xml, one per layout variant
    fn write_slide_layouts<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> Result<()> {
        let mut rels = PartRels::new();
        rels.push(REL_TYPE_SLIDE_MASTER, "../slideMasters/slideMaster1.xml");
        let rels = rels.to_xml();

        for (i, name) in LAYOUT_NAMES.iter().enumerate() {
            zip.start_file(format!("ppt/slideLayouts/slideLayout{}.xml", i + 1), options)?;

            let content = format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" preserve="1" userDrawn="1">
  <p:cSld name="{}">
    <p:spTree>
      <p:nvGrpSpPr>
        <p:cNvPr id="1" name=""/>
        <p:cNvGrpSpPr/>
        <p:nvPr/>
      </p:nvGrpSpPr>
      <p:grpSpPr/>
    </p:spTree>
  </p:cSld>
  <p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sldLayout>"#,
                NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION, name
            );

            zip.write_all(content.as_bytes())?;

            zip.start_file(
                format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", i + 1),
                options,
            )?;
            zip.write_all(rels.as_bytes())?;
        }

        Ok(())
    }

    /// Write a single slide and its relationships
    fn write_slide<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
        slide: &PreparedSlide<'_>,
        theme: &Theme,
    ) -> Result<()> {
        let mut rels = PartRels::new();
        rels.push(
            REL_TYPE_SLIDE_LAYOUT,
            format!("../slideLayouts/slideLayout{}.xml", slide.layout.layout_index()),
        );
        if slide.notes.is_some() {
            rels.push(
                REL_TYPE_NOTES_SLIDE,
                format!("../notesSlides/notesSlide{}.xml", slide.number),
            );
        }
        let background_rel = slide
            .background_part
            .as_ref()
            .map(|name| rels.push(REL_TYPE_IMAGE, format!("../media/{}", name)));
        let image_rel = slide
            .image_part
            .as_ref()
            .map(|name| rels.push(REL_TYPE_IMAGE, format!("../media/{}", name)));

        let content =
            self.generate_slide_xml(slide, theme, background_rel.as_deref(), image_rel.as_deref());

        zip.start_file(format!("ppt/slides/slide{}.xml", slide.number), options)?;
        zip.write_all(content.as_bytes())?;

        zip.start_file(
            format!("ppt/slides/_rels/slide{}.xml.rels", slide.number),
            options,
        )?;
        zip.write_all(rels.to_xml().as_bytes())?;
        Ok(())
    }

    /// Generate slide XML content
    fn generate_slide_xml(
        &self,
        slide: &PreparedSlide<'_>,
        theme: &Theme,
        background_rel: Option<&str>,
        image_rel: Option<&str>,
    ) -> String {
        let mut shapes = String::new();

        shapes.push_str(&self.generate_title_shape(&slide.slide.title, theme));
        shapes.push_str(&self.generate_bullet_shape(
            &slide.slide.bullets,
            slide.layout.body_box(),
            theme,
        ));

        if let (Some(rel_id), Some((_, placed))) = (image_rel, slide.layout.picture()) {
            shapes.push_str(&generate_picture_shape(rel_id, placed, &slide.slide.title));
        }

        // The background fill sits beneath the whole shape tree
        let background = background_rel
            .map(|rel_id| {
                format!(
                    "    <p:bg>\n      <p:bgPr><a:blipFill dpi=\"0\" rotWithShape=\"1\"><a:blip r:embed=\"{}\"/><a:srcRect/><a:stretch><a:fillRect/></a:stretch></a:blipFill><a:effectLst/></p:bgPr>\n    </p:bg>\n",
                    rel_id
                )
            })
            .unwrap_or_default();

        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">
  <p:cSld name="{}">
{}    <p:spTree>
      <p:nvGrpSpPr>
        <p:cNvPr id="1" name=""/>
        <p:cNvGrpSpPr/>
        <p:nvPr/>
      </p:nvGrpSpPr>
      <p:grpSpPr/>
{}    </p:spTree>
  </p:cSld>
  <p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
{}</p:sld>"#,
            NS_DRAWING,
            NS_RELATIONSHIPS,
            NS_PRESENTATION,
            escape_xml(&slide.slide.id),
            background,
            shapes,
            slide.slide.effective_transition().to_xml()
        )
    }

    /// Generate title shape XML
    fn generate_title_shape(&self, title: &str, theme: &Theme) -> String {
        let text = &self.config.text;
        let rpr_attrs = format!(
            "lang=\"{}\" sz=\"{}\" b=\"1\" dirty=\"0\"",
            escape_xml(&self.config.meta.locale),
            text.title_size * 100
        );
        let run_props = self.run_properties(theme.text);

        let paragraph = if title.is_empty() {
            format!(
                "<a:p><a:endParaRPr {}>{}</a:endParaRPr></a:p>",
                rpr_attrs, run_props
            )
        } else {
            format!(
                "<a:p>{}</a:p>",
                text_runs(title, &rpr_attrs, &run_props)
            )
        };

        format!(
            r#"      <p:sp>
        <p:nvSpPr>
          <p:cNvPr id="2" name="{}"/>
          <p:cNvSpPr txBox="1"/>
          <p:nvPr/>
        </p:nvSpPr>
        <p:spPr>{}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>
        <p:txBody>
          <a:bodyPr wrap="square" rtlCol="0" anchor="ctr"/>
          <a:lstStyle/>
          {}
        </p:txBody>
      </p:sp>
"#,
            TITLE_SHAPE_NAME,
            layout::title_box().to_xfrm(),
            paragraph
        )
    }

    /// Generate the bulleted text box
    fn generate_bullet_shape(&self, bullets: &[String], area: Rect, theme: &Theme) -> String {
        let text = &self.config.text;
        let rpr_attrs = format!(
            "lang=\"{}\" sz=\"{}\" dirty=\"0\"",
            escape_xml(&self.config.meta.locale),
            text.body_size * 100
        );
        let run_props = self.run_properties(theme.text);

        let mut paragraphs = String::new();

        if bullets.is_empty() {
            paragraphs.push_str(&format!(
                "          <a:p><a:endParaRPr {}/></a:p>\n",
                rpr_attrs
            ));
        }

        for bullet in bullets {
            paragraphs.push_str(&format!(
                "          <a:p><a:pPr marL=\"{}\" indent=\"-{}\"><a:lnSpc><a:spcPts val=\"{}\"/></a:lnSpc><a:buClr><a:srgbClr val=\"{}\"/></a:buClr><a:buSzPct val=\"100000\"/><a:buFont typeface=\"Arial\"/><a:buChar char=\"{}\"/></a:pPr>{}</a:p>\n",
                BULLET_INDENT_EMU,
                BULLET_INDENT_EMU,
                text.line_spacing * 100,
                theme.accent,
                BULLET_CHAR,
                text_runs(bullet, &rpr_attrs, &run_props)
            ));
        }

        format!(
            r#"      <p:sp>
        <p:nvSpPr>
          <p:cNvPr id="3" name="{}"/>
          <p:cNvSpPr txBox="1"/>
          <p:nvPr/>
        </p:nvSpPr>
        <p:spPr>{}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>
        <p:txBody>
          <a:bodyPr wrap="square" rtlCol="0" anchor="t"><a:normAutofit/></a:bodyPr>
          <a:lstStyle/>
{}        </p:txBody>
      </p:sp>
"#,
            BODY_SHAPE_NAME,
            area.to_xfrm(),
            paragraphs
        )
    }

    /// Child elements of `<a:rPr>`: colour, then typeface
    fn run_properties(&self, color: &str) -> String {
        let font = escape_xml(&self.config.text.font_face);
        format!(
            "<a:solidFill><a:srgbClr val=\"{}\"/></a:solidFill><a:latin typeface=\"{}\"/><a:cs typeface=\"{}\"/>",
            color, font, font
        )
    }

    /// Write ppt/notesMasters/notesMaster1.xml and its rels
    fn write_notes_master<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> Result<()> {
        zip.start_file("ppt/notesMasters/notesMaster1.xml", options)?;

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:notesMaster xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">
  <p:cSld>
    <p:bg>
      <p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef>
    </p:bg>
    <p:spTree>
      <p:nvGrpSpPr>
        <p:cNvPr id="1" name=""/>
        <p:cNvGrpSpPr/>
        <p:nvPr/>
      </p:nvGrpSpPr>
      <p:grpSpPr/>
      <p:sp>
        <p:nvSpPr>
          <p:cNvPr id="2" name="Slide Image Placeholder 1"/>
          <p:cNvSpPr><a:spLocks noGrp="1" noRot="1" noChangeAspect="1"/></p:cNvSpPr>
          <p:nvPr><p:ph type="sldImg" idx="2"/></p:nvPr>
        </p:nvSpPr>
        <p:spPr><a:xfrm><a:off x="685800" y="1143000"/><a:ext cx="5486400" cy="3086100"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>
      </p:sp>
      <p:sp>
        <p:nvSpPr>
          <p:cNvPr id="3" name="Notes Placeholder 2"/>
          <p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>
          <p:nvPr><p:ph type="body" sz="quarter" idx="3"/></p:nvPr>
        </p:nvSpPr>
        <p:spPr><a:xfrm><a:off x="685800" y="4400550"/><a:ext cx="5486400" cy="3600450"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>
        <p:txBody>
          <a:bodyPr/>
          <a:lstStyle/>
          <a:p><a:endParaRPr lang="{}"/></a:p>
        </p:txBody>
      </p:sp>
    </p:spTree>
  </p:cSld>
  <p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>
  <p:notesStyle>
    <a:lvl1pPr marL="0" algn="l"><a:defRPr sz="1200"/></a:lvl1pPr>
  </p:notesStyle>
</p:notesMaster>"#,
            NS_DRAWING,
            NS_RELATIONSHIPS,
            NS_PRESENTATION,
            escape_xml(&self.config.meta.locale)
        );

        zip.write_all(content.as_bytes())?;

        zip.start_file("ppt/notesMasters/_rels/notesMaster1.xml.rels", options)?;
        let mut rels = PartRels::new();
        rels.push(REL_TYPE_THEME, "../theme/theme2.xml");
        zip.write_all(rels.to_xml().as_bytes())?;

        Ok(())
    }

    /// Write speaker notes slide
    fn write_notes_slide<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
        slide_num: usize,
        notes: &str,
    ) -> Result<()> {
        zip.start_file(
            format!("ppt/notesSlides/notesSlide{}.xml", slide_num),
            options,
        )?;

        // One paragraph per line so presenter views keep the line breaks
        let rpr_attrs = format!(
            "lang=\"{}\" dirty=\"0\"",
            escape_xml(&self.config.meta.locale)
        );
        let paragraphs: String = split_lines(notes)
            .into_iter()
            .map(|line| {
                if line.is_empty() {
                    format!("          <a:p><a:endParaRPr {}/></a:p>\n", rpr_attrs)
                } else {
                    format!(
                        "          <a:p><a:r><a:rPr {}/><a:t>{}</a:t></a:r></a:p>\n",
                        rpr_attrs,
                        escape_xml(line)
                    )
                }
            })
            .collect();

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:notes xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">
  <p:cSld>
    <p:spTree>
      <p:nvGrpSpPr>
        <p:cNvPr id="1" name=""/>
        <p:cNvGrpSpPr/>
        <p:nvPr/>
      </p:nvGrpSpPr>
      <p:grpSpPr/>
      <p:sp>
        <p:nvSpPr>
          <p:cNvPr id="2" name="Slide Image Placeholder 1"/>
          <p:cNvSpPr><a:spLocks noGrp="1" noRot="1" noChangeAspect="1"/></p:cNvSpPr>
          <p:nvPr><p:ph type="sldImg"/></p:nvPr>
        </p:nvSpPr>
        <p:spPr/>
      </p:sp>
      <p:sp>
        <p:nvSpPr>
          <p:cNvPr id="3" name="Notes Placeholder 2"/>
          <p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>
          <p:nvPr><p:ph type="body" idx="1"/></p:nvPr>
        </p:nvSpPr>
        <p:spPr/>
        <p:txBody>
          <a:bodyPr/>
          <a:lstStyle/>
{}        </p:txBody>
      </p:sp>
    </p:spTree>
  </p:cSld>
  <p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:notes>"#,
            NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION, paragraphs
        );

        zip.write_all(content.as_bytes())?;

        // Write notes slide rels
        zip.start_file(
            format!("ppt/notesSlides/_rels/notesSlide{}.xml.rels", slide_num),
            options,
        )?;

        let mut rels = PartRels::new();
        rels.push(REL_TYPE_NOTES_MASTER, "../notesMasters/notesMaster1.xml");
        rels.push(REL_TYPE_SLIDE, format!("../slides/slide{}.xml", slide_num));

        zip.write_all(rels.to_xml().as_bytes())?;
        Ok(())
    }
}

/// Picture shape placed inside its contain-fitted box
fn generate_picture_shape(rel_id: &str, placed: Rect, description: &str) -> String {
    format!(
        r#"      <p:pic>
        <p:nvPicPr>
          <p:cNvPr id="4" name="{}" descr="{}"/>
          <p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr>
          <p:nvPr/>
        </p:nvPicPr>
        <p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>
        <p:spPr>{}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>
      </p:pic>
"#,
        PICTURE_SHAPE_NAME,
        escape_xml(description),
        rel_id,
        placed.to_xfrm()
    )
}

/// Runs for one paragraph; embedded line breaks become soft line breaks
fn text_runs(text: &str, rpr_attrs: &str, run_props: &str) -> String {
    split_lines(text)
        .into_iter()
        .map(|line| {
            format!(
                "<a:r><a:rPr {}>{}</a:rPr><a:t>{}</a:t></a:r>",
                rpr_attrs,
                run_props,
                escape_xml(line)
            )
        })
        .collect::<Vec<_>>()
        .join(&format!("<a:br><a:rPr {}/></a:br>", rpr_attrs))
}

/// Split user text at `\r\n`, `\n`, `\r` and vertical tab (U+000B, the
/// soft break editors paste from PowerPoint)
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '\n' | '\r' | '\u{000B}') {
            continue;
        }
        lines.push(&text[start..i]);
        start = i + 1;
        if c == '\r' && matches!(chars.peek(), Some((_, '\n'))) {
            chars.next();
            start += 1;
        }
    }

    lines.push(&text[start..]);
    lines
}

/// Escape XML special characters and drop code points XML 1.0 forbids
pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if c < ' ' || c == '\u{FFFE}' || c == '\u{FFFF}' => {}
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::tests::png;
    use crate::slide::{ImageData, SlideTransition};
    use std::io::Read;
    use zip::ZipArchive;

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    fn has_part(bytes: &[u8], name: &str) -> bool {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let found = archive.by_name(name).is_ok();
        found
    }

    #[test]
    fn test_create_writer() {
        let writer = PptxWriter::default();
        assert_eq!(writer.config().meta.author, "SlideGen AI");
    }

    #[test]
    fn test_rejects_empty_deck() {
        let err = PptxWriter::default()
            .write(&[], "CORPORATE_BLUE", "Empty")
            .unwrap_err();
        assert!(matches!(err, ExportError::EmptyDeck));
    }

    #[test]
    fn test_rejects_unknown_theme() {
        let slides = vec![Slide::with_id("s1", "Hello")];
        let err = PptxWriter::default()
            .write(&slides, "NEON_PINK", "Deck")
            .unwrap_err();
        assert!(matches!(err, ExportError::UnknownTheme { ref id, .. } if id == "NEON_PINK"));
    }

    #[test]
    fn test_generate_with_slides() {
        let slides = vec![
            Slide::with_id("s1", "Welcome"),
            Slide::with_id("s2", "Overview").with_bullets(["First point", "Second point"]),
        ];

        let deck = PptxWriter::default()
            .write(&slides, "MODERN_GREEN", "Test Presentation")
            .unwrap();

        assert_eq!(deck.slide_count, 2);
        assert!(deck.asset_errors.is_empty());
        assert!(has_part(&deck.bytes, "ppt/slides/slide1.xml"));
        assert!(has_part(&deck.bytes, "ppt/slides/slide2.xml"));
        assert!(!has_part(&deck.bytes, "ppt/slides/slide3.xml"));
        assert!(!has_part(&deck.bytes, "ppt/notesMasters/notesMaster1.xml"));

        let slide2 = read_part(&deck.bytes, "ppt/slides/slide2.xml");
        let first = slide2.find("First point").unwrap();
        let second = slide2.find("Second point").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_document_metadata() {
        let slides = vec![Slide::with_id("s1", "Hello")];
        let deck = PptxWriter::default()
            .write(&slides, "CORPORATE_BLUE", "Q4 & Beyond")
            .unwrap();

        let core = read_part(&deck.bytes, "docProps/core.xml");
        assert!(core.contains("<dc:title>Q4 &amp; Beyond</dc:title>"));
        assert!(core.contains("<dc:creator>SlideGen AI</dc:creator>"));

        let app = read_part(&deck.bytes, "docProps/app.xml");
        assert!(app.contains("<Company>SlideGen AI User</Company>"));
        assert!(app.contains("<Slides>1</Slides>"));
    }

    #[test]
    fn test_master_carries_header_bar_and_background() {
        let slides = vec![Slide::with_id("s1", "Hello")];
        let deck = PptxWriter::default()
            .write(&slides, "WARM_ORANGE", "Deck")
            .unwrap();

        let master = read_part(&deck.bytes, "ppt/slideMasters/slideMaster1.xml");
        assert!(master.contains("name=\"Header Bar\""));
        assert!(master.contains("<a:srgbClr val=\"EA580C\"/>"));
        assert!(master.contains("<a:srgbClr val=\"FFF7ED\"/>"));

        // The slide itself does not repeat the bar
        let slide = read_part(&deck.bytes, "ppt/slides/slide1.xml");
        assert!(!slide.contains("Header Bar"));
    }

    #[test]
    fn test_bullet_styling() {
        let slides = vec![Slide::with_id("s1", "Styled").with_bullet("Point")];
        let deck = PptxWriter::default()
            .write(&slides, "CLASSIC_GRAY", "Deck")
            .unwrap();

        let slide = read_part(&deck.bytes, "ppt/slides/slide1.xml");
        assert!(slide.contains("<a:buClr><a:srgbClr val=\"4B5563\"/></a:buClr>"));
        assert!(slide.contains("<a:buChar char=\"\u{2022}\"/>"));
        assert!(slide.contains("<a:spcPts val=\"3000\"/>"));
        assert!(slide.contains("<a:srgbClr val=\"111827\"/>"));
        assert!(slide.contains("sz=\"2400\" b=\"1\""));
    }

    #[test]
    fn test_generate_with_speaker_notes() {
        let slides = vec![
            Slide::with_id("s1", "With Notes").with_notes("These are my speaker notes"),
            Slide::with_id("s2", "Without Notes"),
        ];

        let deck = PptxWriter::default()
            .write(&slides, "CORPORATE_BLUE", "Deck")
            .unwrap();

        assert!(has_part(&deck.bytes, "ppt/notesSlides/notesSlide1.xml"));
        assert!(!has_part(&deck.bytes, "ppt/notesSlides/notesSlide2.xml"));
        assert!(has_part(&deck.bytes, "ppt/notesMasters/notesMaster1.xml"));
        assert!(has_part(&deck.bytes, "ppt/theme/theme2.xml"));

        let notes = read_part(&deck.bytes, "ppt/notesSlides/notesSlide1.xml");
        assert!(notes.contains("These are my speaker notes"));

        // Notes never leak onto the slide surface
        let slide = read_part(&deck.bytes, "ppt/slides/slide1.xml");
        assert!(!slide.contains("speaker notes"));

        let presentation = read_part(&deck.bytes, "ppt/presentation.xml");
        assert!(presentation.contains("<p:notesMasterId r:id=\"rId8\"/>"));
    }

    #[test]
    fn test_image_slide_uses_two_columns() {
        let slides = vec![Slide::with_id("s1", "Chart")
            .with_bullet("Growth")
            .with_image(ImageData::from_bytes(png(64, 32)))];

        let deck = PptxWriter::default()
            .write(&slides, "ELEGANT_PURPLE", "Deck")
            .unwrap();

        assert!(deck.asset_errors.is_empty());
        assert!(has_part(&deck.bytes, "ppt/media/image1.png"));

        let slide = read_part(&deck.bytes, "ppt/slides/slide1.xml");
        assert!(slide.contains("<p:pic>"));
        assert!(slide.contains(&layout::narrow_body_box().to_xfrm()));

        let rels = read_part(&deck.bytes, "ppt/slides/_rels/slide1.xml.rels");
        assert!(rels.contains("slideLayout2.xml"));
        assert!(rels.contains("../media/image1.png"));
    }

    #[test]
    fn test_undecodable_image_falls_back_to_text_only() {
        let slides = vec![
            Slide::with_id("s1", "Fine"),
            Slide::with_id("s2", "Broken").with_image(ImageData::from_bytes(b"not a png".to_vec())),
        ];

        let deck = PptxWriter::default()
            .write(&slides, "CORPORATE_BLUE", "Deck")
            .unwrap();

        assert_eq!(deck.slide_count, 2);
        assert_eq!(deck.asset_errors.len(), 1);
        let error = &deck.asset_errors[0];
        assert_eq!(error.slide_index, 1);
        assert_eq!(error.slide_id, "s2");
        assert_eq!(error.slot, ImageSlot::Image);

        let slide = read_part(&deck.bytes, "ppt/slides/slide2.xml");
        assert!(!slide.contains("<p:pic>"));
        assert!(slide.contains(&layout::full_body_box().to_xfrm()));
    }

    #[test]
    fn test_background_image_sits_under_shapes() {
        let slides = vec![Slide::with_id("s1", "Backdrop")
            .with_bullet("Over the picture")
            .with_background(ImageData::from_bytes(png(16, 9)))];

        let deck = PptxWriter::default()
            .write(&slides, "CORPORATE_BLUE", "Deck")
            .unwrap();

        let slide = read_part(&deck.bytes, "ppt/slides/slide1.xml");
        let bg = slide.find("<p:bg>").unwrap();
        let tree = slide.find("<p:spTree>").unwrap();
        assert!(bg < tree);
        assert!(!slide.contains("<p:pic>"));
        assert!(has_part(&deck.bytes, "ppt/media/image1.png"));
    }

    #[test]
    fn test_transitions() {
        let slides = vec![
            Slide::with_id("s1", "Default"),
            Slide::with_id("s2", "None").with_transition(SlideTransition::None),
            Slide::with_id("s3", "Uncover").with_transition(SlideTransition::Uncover),
        ];

        let deck = PptxWriter::default()
            .write(&slides, "CORPORATE_BLUE", "Deck")
            .unwrap();

        assert!(read_part(&deck.bytes, "ppt/slides/slide1.xml").contains("<p:fade/>"));
        assert!(!read_part(&deck.bytes, "ppt/slides/slide2.xml").contains("<p:transition"));
        assert!(read_part(&deck.bytes, "ppt/slides/slide3.xml").contains("<p:pull/>"));
    }

    #[test]
    fn test_empty_title_and_bullets() {
        let slides = vec![Slide::with_id("s1", "")];
        let deck = PptxWriter::default()
            .write(&slides, "CORPORATE_BLUE", "Deck")
            .unwrap();

        let slide = read_part(&deck.bytes, "ppt/slides/slide1.xml");
        assert!(slide.contains("name=\"Title 1\""));
        assert!(slide.contains("name=\"Bullets 2\""));
        assert!(!slide.contains("<a:buChar"));
    }

    #[test]
    fn test_text_runs_line_breaks() {
        let runs = text_runs("one\ntwo", "lang=\"en-US\"", "");
        assert_eq!(runs.matches("<a:r>").count(), 2);
        assert!(runs.contains("<a:br>"));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("Hello & World"), "Hello &amp; World");
        assert_eq!(escape_xml("<tag>"), "&lt;tag&gt;");
        assert_eq!(escape_xml("\"quoted\""), "&quot;quoted&quot;");
    }

    #[test]
    fn test_escape_xml_drops_forbidden_characters() {
        assert_eq!(escape_xml("form\u{000C}feed\u{0000}"), "formfeed");
        assert_eq!(escape_xml("a\u{0001}\u{001F}b\u{FFFF}"), "ab");
        assert_eq!(escape_xml("tab\there\r\n"), "tab\there\r\n");
    }

    #[test]
    fn test_split_lines() {
        assert_eq!(split_lines("one"), vec!["one"]);
        assert_eq!(split_lines("a\nb"), vec!["a", "b"]);
        assert_eq!(split_lines("a\r\nb\rc"), vec!["a", "b", "c"]);
        assert_eq!(split_lines("Title\u{000B}Soft"), vec!["Title", "Soft"]);
        assert_eq!(split_lines("end\n"), vec!["end", ""]);
    }

    /// Every XML part parses and carries no character XML 1.0 forbids
    fn assert_well_formed(bytes: &[u8]) {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        for i in 0..archive.len() {
            let mut file = archive.by_index(i).unwrap();
            let name = file.name().to_string();
            if !(name.ends_with(".xml") || name.ends_with(".rels")) {
                continue;
            }

            let mut xml = String::new();
            file.read_to_string(&mut xml).unwrap();

            let bad = xml.chars().find(|&c| {
                (c < ' ' && !matches!(c, '\t' | '\n' | '\r')) || c == '\u{FFFE}' || c == '\u{FFFF}'
            });
            assert!(bad.is_none(), "{} contains {:?}", name, bad);

            let mut reader = quick_xml::Reader::from_str(&xml);
            loop {
                match reader.read_event() {
                    Ok(quick_xml::events::Event::Eof) => break,
                    Ok(_) => {}
                    Err(e) => panic!("{} is not well-formed: {}", name, e),
                }
            }
        }
    }

    #[test]
    fn test_control_characters_keep_package_well_formed() {
        let slides = vec![
            Slide::with_id("s1", "Title\u{000B}Soft")
                .with_bullet("form\u{000C}feed")
                .with_bullet("nul\u{0000}byte & <more>")
                .with_notes("bell\u{0007}\r\nnext line"),
            Slide::with_id("s2\u{0001}", "Plain"),
        ];

        let deck = PptxWriter::default()
            .write(&slides, "WARM_ORANGE", "Deck\u{0008}")
            .unwrap();

        assert!(deck.asset_errors.is_empty());
        assert_well_formed(&deck.bytes);

        let slide = read_part(&deck.bytes, "ppt/slides/slide1.xml");
        assert!(slide.contains("<a:t>Title</a:t>"));
        assert!(slide.contains("<a:br>"));
        assert!(slide.contains("<a:t>formfeed</a:t>"));
    }

    #[test]
    fn test_locale_is_escaped() {
        let mut config = ExportConfig::default();
        config.meta.locale = "en\"US".to_string();
        let slides = vec![Slide::with_id("s1", "Hello")
            .with_bullet("World")
            .with_notes("Notes")];

        let deck = PptxWriter::new(config)
            .write(&slides, "CORPORATE_BLUE", "Deck")
            .unwrap();

        assert_well_formed(&deck.bytes);
        assert!(read_part(&deck.bytes, "ppt/slides/slide1.xml").contains("lang=\"en&quot;US\""));
    }

    #[test]
    fn test_media_bytes_are_stored_verbatim() {
        let picture = png(40, 30);
        let backdrop = png(16, 9);
        let slides = vec![Slide::with_id("s1", "Both")
            .with_image(ImageData::from_bytes(picture.clone()))
            .with_background(ImageData::from_bytes(backdrop.clone()))];

        let deck = PptxWriter::default()
            .write(&slides, "CORPORATE_BLUE", "Deck")
            .unwrap();

        let mut archive = ZipArchive::new(Cursor::new(&deck.bytes)).unwrap();
        let mut read = |name: &str| {
            let mut data = Vec::new();
            archive.by_name(name).unwrap().read_to_end(&mut data).unwrap();
            data
        };

        // The background is numbered first within a slide
        assert_eq!(read("ppt/media/image1.png"), backdrop);
        assert_eq!(read("ppt/media/image2.png"), picture);
    }
}
