//! Picture-per-slide `.pptx` writer.
//!
//! Produces the smallest PresentationML package PowerPoint and LibreOffice
//! both open: one slide master, one blank layout, one theme, and one slide
//! per JPEG, each carrying a single picture placed by a [`PageGeometry`].
//!
//! ```text
//! [Content_Types].xml
//! _rels/.rels
//! ppt/presentation.xml              + _rels/presentation.xml.rels
//! ppt/slideMasters/slideMaster1.xml + _rels
//! ppt/slideLayouts/slideLayout1.xml + _rels
//! ppt/theme/theme1.xml
//! ppt/slides/slideN.xml             + _rels
//! ppt/media/imageN.jpeg
//! ```

use crate::error::ConvertError;
use crate::geometry::{PageGeometry, PageSize};
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// English Metric Units per millimetre.
pub const EMU_PER_MM: f64 = 36_000.0;

/// Slide dimensions PowerPoint accepts, in EMU (1 inch .. 56 inches).
const MIN_SLIDE_EMU: i64 = 914_400;
const MAX_SLIDE_EMU: i64 = 51_206_400;

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Millimetres to EMU, rounded.
pub fn mm_to_emu(mm: f64) -> i64 {
    (mm * EMU_PER_MM).round() as i64
}

struct Slide {
    jpeg: Vec<u8>,
    geometry: PageGeometry,
}

/// Accumulates slides, then writes the package in one go.
pub struct PresentationBuilder {
    slide_size: PageSize,
    slides: Vec<Slide>,
}

impl PresentationBuilder {
    /// New presentation whose slides are `slide_size`.
    pub fn new(slide_size: PageSize) -> Self {
        Self {
            slide_size,
            slides: Vec::new(),
        }
    }

    /// Append a slide showing `jpeg` in the box described by `geometry`.
    pub fn add_slide(&mut self, jpeg: Vec<u8>, geometry: PageGeometry) {
        self.slides.push(Slide { jpeg, geometry });
    }

    pub fn slide_size(&self) -> PageSize {
        self.slide_size
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Slide size in EMU, clamped to the range PowerPoint accepts.
    fn slide_emu(&self) -> (i64, i64) {
        let clamp = |mm: f64| mm_to_emu(mm).clamp(MIN_SLIDE_EMU, MAX_SLIDE_EMU);
        (clamp(self.slide_size.width_mm), clamp(self.slide_size.height_mm))
    }

    /// Write the package to `output`.
    pub fn save(&self, output: &Path) -> Result<(), ConvertError> {
        let file = File::create(output).map_err(|e| ConvertError::output(output, e))?;
        self.write_to(BufWriter::new(file))
            .and_then(|mut w| w.flush().map_err(zip::result::ZipError::Io))
            .map_err(|e| ConvertError::PresentationWrite {
                path: output.to_path_buf(),
                detail: e.to_string(),
            })?;
        debug!("Wrote {} slide(s) to {}", self.slides.len(), output.display());
        Ok(())
    }

    /// Write the package into any seekable sink, returning it.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> zip::result::ZipResult<W> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        // Already-compressed JPEG data gains nothing from deflate.
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        let part = |zip: &mut ZipWriter<W>, name: &str, body: &str| {
            zip.start_file(name, options)?;
            zip.write_all(body.as_bytes())?;
            Ok::<_, zip::result::ZipError>(())
        };

        let n = self.slides.len();
        part(&mut zip, "[Content_Types].xml", &content_types(n))?;
        part(&mut zip, "_rels/.rels", &package_rels())?;
        part(&mut zip, "ppt/presentation.xml", &presentation(n, self.slide_emu()))?;
        part(&mut zip, "ppt/_rels/presentation.xml.rels", &presentation_rels(n))?;
        part(&mut zip, "ppt/slideMasters/slideMaster1.xml", &slide_master())?;
        part(
            &mut zip,
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            &slide_master_rels(),
        )?;
        part(&mut zip, "ppt/slideLayouts/slideLayout1.xml", &slide_layout())?;
        part(
            &mut zip,
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            &slide_layout_rels(),
        )?;
        part(&mut zip, "ppt/theme/theme1.xml", THEME)?;

        for (i, slide) in self.slides.iter().enumerate() {
            let num = i + 1;
            part(&mut zip, &format!("ppt/slides/slide{num}.xml"), &slide_xml(num, &slide.geometry))?;
            part(
                &mut zip,
                &format!("ppt/slides/_rels/slide{num}.xml.rels"),
                &slide_rels(num),
            )?;
            zip.start_file(format!("ppt/media/image{num}.jpeg"), stored)?;
            zip.write_all(&slide.jpeg)?;
        }

        zip.finish()
    }
}

fn rel(id: &str, kind: &str, target: &str) -> String {
    format!(r#"<Relationship Id="{id}" Type="{REL_BASE}/{kind}" Target="{target}"/>"#)
}

fn relationships(rels: &[String]) -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="{NS_RELS}">{}</Relationships>"#,
        rels.concat()
    )
}

fn content_types(slides: usize) -> String {
    const CT: &str = "application/vnd.openxmlformats-officedocument";
    let mut xml = format!(
        concat!(
            r#"{decl}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Default Extension="jpeg" ContentType="image/jpeg"/>"#,
            r#"<Override PartName="/ppt/presentation.xml" ContentType="{ct}.presentationml.presentation.main+xml"/>"#,
            r#"<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="{ct}.presentationml.slideMaster+xml"/>"#,
            r#"<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="{ct}.presentationml.slideLayout+xml"/>"#,
            r#"<Override PartName="/ppt/theme/theme1.xml" ContentType="{ct}.theme+xml"/>"#,
        ),
        decl = XML_DECL,
        ct = CT
    );
    for num in 1..=slides {
        xml.push_str(&format!(
            r#"<Override PartName="/ppt/slides/slide{num}.xml" ContentType="{CT}.presentationml.slide+xml"/>"#
        ));
    }
    xml.push_str("</Types>");
    xml
}

fn package_rels() -> String {
    relationships(&[rel("rId1", "officeDocument", "ppt/presentation.xml")])
}

/// `presentation.xml`. Relationship ids: `rId1` master, `rId2..` slides.
fn presentation(slides: usize, (cx, cy): (i64, i64)) -> String {
    let ids: String = (0..slides)
        .map(|i| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, i + 2))
        .collect();
    let id_list = if ids.is_empty() {
        String::new()
    } else {
        format!("<p:sldIdLst>{ids}</p:sldIdLst>")
    };
    format!(
        concat!(
            r#"{XML_DECL}<p:presentation xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}">"#,
            r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#,
            r#"{id_list}<p:sldSz cx="{cx}" cy="{cy}"/><p:notesSz cx="6858000" cy="9144000"/>"#,
            r#"</p:presentation>"#
        ),
        XML_DECL = XML_DECL,
        NS_A = NS_A,
        NS_R = NS_R,
        NS_P = NS_P,
        id_list = id_list,
        cx = cx,
        cy = cy
    )
}

fn presentation_rels(slides: usize) -> String {
    let mut rels = vec![rel("rId1", "slideMaster", "slideMasters/slideMaster1.xml")];
    for i in 0..slides {
        rels.push(rel(
            &format!("rId{}", i + 2),
            "slide",
            &format!("slides/slide{}.xml", i + 1),
        ));
    }
    rels.push(rel(&format!("rId{}", slides + 2), "theme", "theme/theme1.xml"));
    relationships(&rels)
}

const EMPTY_TREE: &str = concat!(
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
    r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#
);

fn slide_master() -> String {
    format!(
        concat!(
            r#"{}<p:sldMaster xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
            r#"<p:cSld><p:spTree>{}</p:spTree></p:cSld>"#,
            r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" "#,
            r#"accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#,
            r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>"#,
            r#"</p:sldMaster>"#
        ),
        XML_DECL, NS_A, NS_R, NS_P, EMPTY_TREE
    )
}

fn slide_master_rels() -> String {
    relationships(&[
        rel("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
        rel("rId2", "theme", "../theme/theme1.xml"),
    ])
}

fn slide_layout() -> String {
    format!(
        concat!(
            r#"{}<p:sldLayout xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" type="blank" preserve="1">"#,
            r#"<p:cSld name="Blank"><p:spTree>{}</p:spTree></p:cSld>"#,
            r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#
        ),
        XML_DECL, NS_A, NS_R, NS_P, EMPTY_TREE
    )
}

fn slide_layout_rels() -> String {
    relationships(&[rel("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")])
}

fn slide_xml(num: usize, g: &PageGeometry) -> String {
    format!(
        concat!(
            r#"{decl}<p:sld xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}">"#,
            r#"<p:cSld><p:spTree>{tree}"#,
            r#"<p:pic><p:nvPicPr><p:cNvPr id="2" name="Page {num}"/>"#,
            r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#,
            r#"<p:blipFill><a:blip r:embed="rId2"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#,
            r#"<p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
            r#"</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#
        ),
        decl = XML_DECL,
        a = NS_A,
        r = NS_R,
        p = NS_P,
        tree = EMPTY_TREE,
        num = num,
        x = mm_to_emu(g.offset_x),
        y = mm_to_emu(g.offset_y),
        cx = mm_to_emu(g.content_width),
        cy = mm_to_emu(g.content_height),
    )
}

fn slide_rels(num: usize) -> String {
    relationships(&[
        rel("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
        rel("rId2", "image", &format!("../media/image{num}.jpeg")),
    ])
}

const THEME: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme">"#,
    r#"<a:themeElements>"#,
    r#"<a:clrScheme name="Office">"#,
    r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#,
    r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#,
    r#"<a:dk2><a:srgbClr val="44546A"/></a:dk2><a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>"#,
    r#"<a:accent1><a:srgbClr val="4472C4"/></a:accent1><a:accent2><a:srgbClr val="ED7D31"/></a:accent2>"#,
    r#"<a:accent3><a:srgbClr val="A5A5A5"/></a:accent3><a:accent4><a:srgbClr val="FFC000"/></a:accent4>"#,
    r#"<a:accent5><a:srgbClr val="5B9BD5"/></a:accent5><a:accent6><a:srgbClr val="70AD47"/></a:accent6>"#,
    r#"<a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink>"#,
    r#"</a:clrScheme>"#,
    r#"<a:fontScheme name="Office">"#,
    r#"<a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
    r#"<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>"#,
    r#"</a:fontScheme>"#,
    r#"<a:fmtScheme name="Office">"#,
    r#"<a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst>"#,
    r#"<a:lnStyleLst><a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
    r#"<a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
    r#"<a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst>"#,
    r#"<a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle>"#,
    r#"<a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst>"#,
    r#"<a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst>"#,
    r#"</a:fmtScheme>"#,
    r#"</a:themeElements></a:theme>"#
);
