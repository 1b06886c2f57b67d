//! Output PDF assembly
//!
//! Builds the handout document: fixed A4 portrait pages, each holding a
//! grid of rasterized source slides. Slides are rasterized one at a time,
//! embedded as JPEG image XObjects, and stretched to fill their slot
//! exactly. Rasterizing instead of copying page content sidesteps
//! coordinate-system and content-stream mismatches between the reading
//! and writing toolchains, trading vector fidelity for robustness.

use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use thiserror::Error;

use super::grid::GridShape;
use crate::pdf::{PdfError, SourceDocument};

/// ISO A4 portrait, in PDF points.
pub const PAGE_WIDTH_PT: f32 = 595.276;
pub const PAGE_HEIGHT_PT: f32 = 841.89;

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error(transparent)]
    Pdf(#[from] PdfError),

    #[error("Failed to serialize output PDF: {0}")]
    Write(String),
}

/// Compose the selected slides into a grid handout.
///
/// The selection is walked in order, one grid slot per entry, opening a new
/// output page whenever rows x cols slots are used up. A trailing partial
/// page keeps its unused slots blank. Callers validate that the selection
/// is non-empty and in range; an out-of-range entry still fails cleanly
/// here rather than faulting.
pub fn compose_handout(
    source: &SourceDocument,
    grid: GridShape,
    selection: &[u32],
) -> Result<Vec<u8>, ComposeError> {
    let mut output = Document::with_version("1.5");
    let pages_id = output.new_object_id();

    let slots = grid.slots_per_page();
    let mut page_ids: Vec<Object> = Vec::with_capacity(grid.page_count_for(selection.len()));

    for chunk in selection.chunks(slots) {
        let mut xobjects = Dictionary::new();
        let mut content_ops = String::new();

        for (slot, &page_number) in chunk.iter().enumerate() {
            // The raster buffer lives only for this slot.
            let raster = source.rasterize_page(page_number)?;
            let image_id = output.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => raster.width as i64,
                    "Height" => raster.height as i64,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                    "Filter" => "DCTDecode",
                },
                raster.data,
            ));

            let name = format!("Im{}", slot);
            xobjects.set(name.clone(), image_id);

            // Unit image square scaled to the slot; stretch to fill,
            // aspect distortion accepted.
            let rect = grid.slot_rect(slot, PAGE_WIDTH_PT, PAGE_HEIGHT_PT);
            content_ops.push_str(&format!(
                "q {} 0 0 {} {} {} cm /{} Do Q\n",
                rect.width, rect.height, rect.x, rect.y, name
            ));
        }

        let content_id =
            output.add_object(Stream::new(Dictionary::new(), content_ops.into_bytes()));
        let page_id = output.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                Object::Real(PAGE_WIDTH_PT.into()),
                Object::Real(PAGE_HEIGHT_PT.into()),
            ],
            "Resources" => dictionary! { "XObject" => xobjects },
            "Contents" => content_id,
        });
        page_ids.push(page_id.into());
    }

    let page_count = page_ids.len() as i64;
    output.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids,
            "Count" => page_count,
        }),
    );

    let catalog_id = output.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    output.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    output
        .save_to(&mut buffer)
        .map_err(|e| ComposeError::Write(e.to_string()))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata::blank_pdf;
    use lopdf::Document as OutputDoc;

    fn compose(source_pages: usize, rows: u32, cols: u32, selection: &[u32]) -> Vec<u8> {
        let source = SourceDocument::from_bytes(blank_pdf(source_pages)).unwrap();
        let grid = GridShape::new(rows, cols).unwrap();
        compose_handout(&source, grid, selection).unwrap()
    }

    fn number(obj: &Object) -> f32 {
        match obj {
            Object::Integer(i) => *i as f32,
            Object::Real(r) => *r as f32,
            other => panic!("expected a number, got {:?}", other),
        }
    }

    /// (name, x, y) triples parsed from the page's `cm ... Do` operations,
    /// in paint order.
    fn placements(doc: &OutputDoc, page_id: lopdf::ObjectId) -> Vec<(String, f32, f32)> {
        let content = String::from_utf8(doc.get_page_content(page_id).unwrap()).unwrap();
        content
            .lines()
            .filter(|line| line.contains(" cm "))
            .map(|line| {
                // q w 0 0 h x y cm /ImN Do Q
                let tokens: Vec<&str> = line.split_whitespace().collect();
                let x: f32 = tokens[5].parse().unwrap();
                let y: f32 = tokens[6].parse().unwrap();
                let name = tokens[8].trim_start_matches('/').to_string();
                (name, x, y)
            })
            .collect()
    }

    #[test]
    fn full_grid_fits_one_page() {
        let bytes = compose(4, 2, 2, &[1, 2, 3, 4]);
        let doc = OutputDoc::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn pagination_is_ceiling_of_selection_over_slots() {
        let doc = OutputDoc::load_mem(&compose(3, 2, 2, &[1, 2, 3, 1, 2])).unwrap();
        assert_eq!(doc.get_pages().len(), 2);

        let doc = OutputDoc::load_mem(&compose(3, 1, 1, &[1, 2])).unwrap();
        assert_eq!(doc.get_pages().len(), 2);

        let doc = OutputDoc::load_mem(&compose(3, 3, 2, &[1, 2, 3])).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn output_pages_are_a4_portrait() {
        let bytes = compose(1, 2, 2, &[1]);
        let doc = OutputDoc::load_mem(&bytes).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
        assert!((number(&media_box[2]) - PAGE_WIDTH_PT).abs() < 0.01);
        assert!((number(&media_box[3]) - PAGE_HEIGHT_PT).abs() < 0.01);
    }

    #[test]
    fn slots_fill_row_major_top_left_first() {
        let bytes = compose(4, 2, 2, &[1, 2, 3, 4]);
        let doc = OutputDoc::load_mem(&bytes).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();

        let placed = placements(&doc, page_id);
        assert_eq!(placed.len(), 4);

        let slot_w = PAGE_WIDTH_PT / 2.0;
        let slot_h = PAGE_HEIGHT_PT / 2.0;

        // Slide 1: top-left.
        assert_eq!(placed[0].0, "Im0");
        assert!(placed[0].1.abs() < 0.01);
        assert!((placed[0].2 - slot_h).abs() < 0.01);
        // Slide 2: top-right.
        assert!((placed[1].1 - slot_w).abs() < 0.01);
        assert!((placed[1].2 - slot_h).abs() < 0.01);
        // Slide 3: bottom-left.
        assert!(placed[2].1.abs() < 0.01);
        assert!(placed[2].2.abs() < 0.01);
        // Slide 4: bottom-right.
        assert!((placed[3].1 - slot_w).abs() < 0.01);
        assert!(placed[3].2.abs() < 0.01);
    }

    #[test]
    fn partial_last_page_leaves_slots_blank() {
        let bytes = compose(3, 2, 2, &[1, 2, 3, 1, 2]);
        let doc = OutputDoc::load_mem(&bytes).unwrap();
        let pages: Vec<_> = doc.get_pages().into_values().collect();
        assert_eq!(pages.len(), 2);

        assert_eq!(placements(&doc, pages[0]).len(), 4);
        let last = placements(&doc, pages[1]);
        assert_eq!(last.len(), 1);
        // The lone fifth slide lands back in the top-left slot.
        assert!(last[0].1.abs() < 0.01);
        assert!((last[0].2 - PAGE_HEIGHT_PT / 2.0).abs() < 0.01);
    }

    #[test]
    fn embedded_images_are_jpeg_xobjects() {
        let bytes = compose(2, 1, 2, &[1, 2]);
        let doc = OutputDoc::load_mem(&bytes).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        assert_eq!(xobjects.len(), 2);

        for (_, value) in xobjects.iter() {
            let id = value.as_reference().unwrap();
            let stream = doc.get_object(id).unwrap().as_stream().unwrap();
            assert_eq!(
                stream.dict.get(b"Filter").unwrap(),
                &Object::Name(b"DCTDecode".to_vec())
            );
            assert_eq!(&stream.content[..2], &[0xFF, 0xD8]);
        }
    }

    #[test]
    fn repeated_compose_gives_identical_structure() {
        let source = SourceDocument::from_bytes(blank_pdf(3)).unwrap();
        let grid = GridShape::new(2, 2).unwrap();
        let selection = [1, 3, 2];

        let first = compose_handout(&source, grid, &selection).unwrap();
        let second = compose_handout(&source, grid, &selection).unwrap();

        let doc_a = OutputDoc::load_mem(&first).unwrap();
        let doc_b = OutputDoc::load_mem(&second).unwrap();
        assert_eq!(doc_a.get_pages().len(), doc_b.get_pages().len());

        let (_, page_a) = doc_a.get_pages().into_iter().next().unwrap();
        let (_, page_b) = doc_b.get_pages().into_iter().next().unwrap();
        assert_eq!(placements(&doc_a, page_a), placements(&doc_b, page_b));
    }

    #[test]
    fn out_of_range_slide_fails_without_output() {
        let source = SourceDocument::from_bytes(blank_pdf(3)).unwrap();
        let grid = GridShape::new(2, 2).unwrap();
        let result = compose_handout(&source, grid, &[1, 7]);
        assert!(matches!(
            result,
            Err(ComposeError::Pdf(PdfError::PageOutOfRange {
                page: 7,
                total: 3
            }))
        ));
    }

    #[test]
    fn selected_slides_may_repeat() {
        let bytes = compose(1, 2, 2, &[1, 1, 1, 1]);
        let doc = OutputDoc::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        assert_eq!(placements(&doc, page_id).len(), 4);
    }
}
