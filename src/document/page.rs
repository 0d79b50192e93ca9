//! Page records and the page tree walk.
//!
//! Leaves are recorded in depth-first traversal order. The inheritable
//! attributes (`Resources`, `MediaBox`, `CropBox`, `Rotate`) are carried
//! down from interior nodes; everything else is taken from the leaf.

use crate::document::PdfDocument;
use crate::error::{PdfError, PdfResult};
use crate::parser::resolver::ObjectResolver;
use crate::types::{PdfArray, PdfDictionary, PdfReference, PdfValue};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An axis-aligned rectangle, stored as `[x1 y1 x2 y2]` with the corners
/// normalized so that `x1 <= x2` and `y1 <= y2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Rect {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let (y1, y2) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        Rect { x1, y1, x2, y2 }
    }

    /// Reads an array of four numbers. Anything else is `None`.
    pub fn from_value(value: &PdfValue) -> Option<Rect> {
        let array = value.as_array()?;
        if array.len() < 4 {
            return None;
        }
        let mut corners = [0.0f64; 4];
        for (slot, element) in corners.iter_mut().zip(array.iter()) {
            *slot = element.as_real()?;
        }
        Some(Rect::new(corners[0], corners[1], corners[2], corners[3]))
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }
}

/// The resource bundle a page draws from, one slot per category.
///
/// Slots are shallow clones of the dictionaries found on the page or
/// inherited from the nearest ancestor; absent slots stay `None`.
#[derive(Debug, Clone, Default)]
pub struct Resources {
    pub font: Option<PdfDictionary>,
    pub x_object: Option<PdfDictionary>,
    pub ext_g_state: Option<PdfDictionary>,
    pub color_space: Option<PdfDictionary>,
    pub pattern: Option<PdfDictionary>,
    pub shading: Option<PdfDictionary>,
    pub properties: Option<PdfDictionary>,
    pub proc_set: Option<PdfArray>,
}

impl Resources {
    fn from_dict(
        dict: &PdfDictionary,
        resolver: &mut ObjectResolver<'_>,
    ) -> PdfResult<Resources> {
        Ok(Resources {
            font: dict_slot(dict, "Font", resolver)?,
            x_object: dict_slot(dict, "XObject", resolver)?,
            ext_g_state: dict_slot(dict, "ExtGState", resolver)?,
            color_space: dict_slot(dict, "ColorSpace", resolver)?,
            pattern: dict_slot(dict, "Pattern", resolver)?,
            shading: dict_slot(dict, "Shading", resolver)?,
            properties: dict_slot(dict, "Properties", resolver)?,
            proc_set: array_slot(dict, "ProcSet", resolver)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.font.is_none()
            && self.x_object.is_none()
            && self.ext_g_state.is_none()
            && self.color_space.is_none()
            && self.pattern.is_none()
            && self.shading.is_none()
            && self.properties.is_none()
            && self.proc_set.is_none()
    }
}

fn dict_slot(
    dict: &PdfDictionary,
    key: &str,
    resolver: &mut ObjectResolver<'_>,
) -> PdfResult<Option<PdfDictionary>> {
    let Some(value) = dict.get(key) else {
        return Ok(None);
    };
    match resolver.resolve_if_reference(value)? {
        PdfValue::Dictionary(d) => Ok(Some(d)),
        PdfValue::Null => Ok(None),
        other => {
            warn!("resource slot /{} is a {}, not a dictionary", key, other.kind());
            Ok(None)
        }
    }
}

fn array_slot(
    dict: &PdfDictionary,
    key: &str,
    resolver: &mut ObjectResolver<'_>,
) -> PdfResult<Option<PdfArray>> {
    let Some(value) = dict.get(key) else {
        return Ok(None);
    };
    match resolver.resolve_if_reference(value)? {
        PdfValue::Array(a) => Ok(Some(a)),
        PdfValue::Null => Ok(None),
        other => {
            warn!("resource slot /{} is a {}, not an array", key, other.kind());
            Ok(None)
        }
    }
}

/// The content streams of a page: a single stream, an ordered run of
/// streams, or none for a blank page.
#[derive(Debug, Clone, PartialEq)]
pub enum Contents {
    None,
    One(PdfReference),
    Several(Vec<PdfReference>),
}

impl Contents {
    pub fn refs(&self) -> Vec<PdfReference> {
        match self {
            Contents::None => Vec::new(),
            Contents::One(reference) => vec![*reference],
            Contents::Several(references) => references.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Contents::None)
    }
}

/// One leaf of the page tree with every inherited attribute applied.
#[derive(Debug, Clone)]
pub struct Page {
    pub object_ref: PdfReference,
    pub media_box: Rect,
    pub crop_box: Rect,
    pub bleed_box: Option<Rect>,
    pub trim_box: Option<Rect>,
    pub art_box: Option<Rect>,
    pub resources: Resources,
    pub contents: Contents,
    pub annots: Option<Vec<PdfReference>>,
    /// Always one of 0, 90, 180, 270 after normalization.
    pub rotate: i32,
    pub user_unit: f64,
    pub parent: Option<PdfReference>,
}

impl Page {
    pub fn width(&self) -> f64 {
        self.crop_box.width() * self.user_unit
    }

    pub fn height(&self) -> f64 {
        self.crop_box.height() * self.user_unit
    }

    pub fn rotation(&self) -> i32 {
        self.rotate
    }

    /// True when the page is wider than tall once rotation is applied.
    pub fn is_landscape(&self) -> bool {
        let (width, height) = if self.rotate % 180 == 0 {
            (self.width(), self.height())
        } else {
            (self.height(), self.width())
        };
        width > height
    }
}

/// Attributes carried down while descending the tree.
#[derive(Debug, Clone, Default)]
struct Inherited {
    resources: Option<PdfDictionary>,
    media_box: Option<Rect>,
    crop_box: Option<Rect>,
    rotate: Option<i64>,
}

pub struct PageTreeBuilder<'doc, 'res> {
    document: &'doc PdfDocument,
    resolver: &'res mut ObjectResolver<'doc>,
}

impl<'doc, 'res> PageTreeBuilder<'doc, 'res> {
    pub fn new(document: &'doc PdfDocument, resolver: &'res mut ObjectResolver<'doc>) -> Self {
        PageTreeBuilder { document, resolver }
    }

    pub fn build(mut self) -> PdfResult<Vec<Page>> {
        let catalog = self.document.catalog(self.resolver)?;
        let pages_value = catalog
            .get("Pages")
            .ok_or_else(|| PdfError::PageStructure("catalog has no /Pages".into()))?;
        let pages_ref = pages_value.as_reference().copied().ok_or_else(|| {
            PdfError::PageStructure("catalog /Pages is not an indirect reference".into())
        })?;

        let mut pages = Vec::new();
        let mut visited = HashSet::new();
        self.walk(pages_ref, &Inherited::default(), &mut visited, &mut pages)?;
        Ok(pages)
    }

    fn walk(
        &mut self,
        node_ref: PdfReference,
        inherited: &Inherited,
        visited: &mut HashSet<crate::types::ObjectId>,
        out: &mut Vec<Page>,
    ) -> PdfResult<()> {
        if !visited.insert(node_ref.id()) {
            return Err(PdfError::PageStructure(format!(
                "cycle in page tree at {}",
                node_ref
            )));
        }

        let node = self.resolver.resolve_shallow(&node_ref)?;
        let dict = node.value.as_dict().cloned().ok_or_else(|| {
            PdfError::PageStructure(format!("page tree node {} is not a dictionary", node_ref))
        })?;

        let merged = self.merge_inherited(&dict, node_ref, inherited)?;

        match dict.type_name().map(|n| n.as_str().to_string()).as_deref() {
            Some("Pages") => self.walk_kids(&dict, node_ref, &merged, visited, out),
            Some("Page") => {
                let page = self.build_page(node_ref, &dict, &merged)?;
                out.push(page);
                Ok(())
            }
            Some(other) => Err(PdfError::PageStructure(format!(
                "unexpected /Type /{} in page tree at {}",
                other, node_ref
            ))),
            None if dict.contains_key("Kids") => {
                warn!("node {} lacks /Type, treating as /Pages", node_ref);
                self.walk_kids(&dict, node_ref, &merged, visited, out)
            }
            None => {
                warn!("node {} lacks /Type, treating as /Page", node_ref);
                let page = self.build_page(node_ref, &dict, &merged)?;
                out.push(page);
                Ok(())
            }
        }
    }

    fn walk_kids(
        &mut self,
        dict: &PdfDictionary,
        node_ref: PdfReference,
        inherited: &Inherited,
        visited: &mut HashSet<crate::types::ObjectId>,
        out: &mut Vec<Page>,
    ) -> PdfResult<()> {
        let kids_value = dict.get("Kids").ok_or_else(|| {
            PdfError::PageStructure(format!("/Pages node {} has no /Kids", node_ref))
        })?;
        let kids = self.resolver.resolve_if_reference(kids_value)?;
        let kids = kids.as_array().ok_or_else(|| {
            PdfError::PageStructure(format!("/Kids of {} is not an array", node_ref))
        })?;

        let before = out.len();
        for kid in kids.iter() {
            let kid_ref = kid.as_reference().copied().ok_or_else(|| {
                PdfError::PageStructure(format!(
                    "kid of {} is not an indirect reference",
                    node_ref
                ))
            })?;
            self.walk(kid_ref, inherited, visited, out)?;
        }

        if let Some(declared) = dict.get("Count").and_then(PdfValue::as_integer) {
            let found = (out.len() - before) as i64;
            if declared != found {
                warn!(
                    "/Pages node {} declares {} leaves, traversal found {}",
                    node_ref, declared, found
                );
            }
        }
        Ok(())
    }

    fn merge_inherited(
        &mut self,
        dict: &PdfDictionary,
        node_ref: PdfReference,
        inherited: &Inherited,
    ) -> PdfResult<Inherited> {
        let mut merged = inherited.clone();

        if let Some(value) = dict.get("Resources") {
            match self.resolver.resolve_if_reference(value)? {
                PdfValue::Dictionary(resources) => merged.resources = Some(resources),
                other => warn!(
                    "/Resources of {} is a {}, ignoring",
                    node_ref,
                    other.kind()
                ),
            }
        }
        if let Some(value) = dict.get("MediaBox") {
            match Rect::from_value(&self.resolver.resolve_if_reference(value)?) {
                Some(rect) => merged.media_box = Some(rect),
                None => warn!("malformed /MediaBox on {}, ignoring", node_ref),
            }
        }
        if let Some(value) = dict.get("CropBox") {
            match Rect::from_value(&self.resolver.resolve_if_reference(value)?) {
                Some(rect) => merged.crop_box = Some(rect),
                None => warn!("malformed /CropBox on {}, ignoring", node_ref),
            }
        }
        if let Some(value) = dict.get("Rotate") {
            match self.resolver.resolve_if_reference(value)?.as_integer() {
                Some(rotate) => merged.rotate = Some(rotate),
                None => warn!("non-integer /Rotate on {}, ignoring", node_ref),
            }
        }

        Ok(merged)
    }

    fn build_page(
        &mut self,
        page_ref: PdfReference,
        dict: &PdfDictionary,
        inherited: &Inherited,
    ) -> PdfResult<Page> {
        let media_box = inherited.media_box.ok_or_else(|| {
            PdfError::PageStructure(format!(
                "page {} has no MediaBox anywhere in its parent chain",
                page_ref
            ))
        })?;
        let crop_box = inherited.crop_box.unwrap_or(media_box);
        let rotate = normalize_rotation(inherited.rotate.unwrap_or(0));

        let resources = match &inherited.resources {
            Some(resources) => Resources::from_dict(resources, self.resolver)?,
            None => {
                warn!("page {} has no Resources anywhere in its parent chain", page_ref);
                Resources::default()
            }
        };

        let bleed_box = self.optional_box(dict, "BleedBox", page_ref)?;
        let trim_box = self.optional_box(dict, "TrimBox", page_ref)?;
        let art_box = self.optional_box(dict, "ArtBox", page_ref)?;

        let contents = match dict.get("Contents") {
            None => Contents::None,
            Some(PdfValue::Reference(reference)) => Contents::One(*reference),
            Some(value) => {
                let resolved = self.resolver.resolve_if_reference(value)?;
                match resolved.as_array() {
                    Some(array) => Contents::Several(collect_refs(array, page_ref, "Contents")),
                    None => {
                        warn!("/Contents of page {} is neither a reference nor an array", page_ref);
                        Contents::None
                    }
                }
            }
        };

        let annots = match dict.get("Annots") {
            None => None,
            Some(value) => {
                let resolved = self.resolver.resolve_if_reference(value)?;
                resolved
                    .as_array()
                    .map(|array| collect_refs(array, page_ref, "Annots"))
            }
        };

        let user_unit = dict
            .get("UserUnit")
            .and_then(PdfValue::as_real)
            .unwrap_or(1.0);
        let parent = dict.get("Parent").and_then(PdfValue::as_reference).copied();

        Ok(Page {
            object_ref: page_ref,
            media_box,
            crop_box,
            bleed_box,
            trim_box,
            art_box,
            resources,
            contents,
            annots,
            rotate,
            user_unit,
            parent,
        })
    }

    fn optional_box(
        &mut self,
        dict: &PdfDictionary,
        key: &str,
        page_ref: PdfReference,
    ) -> PdfResult<Option<Rect>> {
        let Some(value) = dict.get(key) else {
            return Ok(None);
        };
        let resolved = self.resolver.resolve_if_reference(value)?;
        let rect = Rect::from_value(&resolved);
        if rect.is_none() {
            warn!("malformed /{} on page {}, ignoring", key, page_ref);
        }
        Ok(rect)
    }
}

fn collect_refs(array: &PdfArray, page_ref: PdfReference, key: &str) -> Vec<PdfReference> {
    let mut refs = Vec::with_capacity(array.len());
    for element in array.iter() {
        match element.as_reference() {
            Some(reference) => refs.push(*reference),
            None => warn!(
                "/{} of page {} holds a direct {}, skipping",
                key,
                page_ref,
                element.kind()
            ),
        }
    }
    refs
}

/// Clamps a rotation to {0, 90, 180, 270}: modulo 360, then rounded to
/// the nearest multiple of 90.
fn normalize_rotation(rotate: i64) -> i32 {
    if matches!(rotate, 0 | 90 | 180 | 270) {
        return rotate as i32;
    }
    let wrapped = rotate.rem_euclid(360) as f64;
    let rounded = (((wrapped / 90.0).round() as i64) * 90).rem_euclid(360) as i32;
    warn!("page rotation {} normalized to {}", rotate, rounded);
    rounded
}
