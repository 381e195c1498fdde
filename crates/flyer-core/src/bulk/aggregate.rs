//! Result aggregation: one merged PDF or one ZIP of named PDFs
//!
//! Aggregation runs after the jobs are done and fails independently of
//! them; the per-SKU bytes in the `RunResult` survive an aggregation
//! error.

use crate::constants::flyer_entry_name;
use crate::error::{FlyerError, Result};
use flyer_types::{OutputMode, Sku};
use lopdf::{Document, Object, ObjectId};
use std::collections::{BTreeMap, HashMap};
use std::io::{Cursor, Write};

/// Produce the requested output container from the successful PDFs
pub fn aggregate(
    mode: OutputMode,
    order: &[Sku],
    pdfs: &HashMap<Sku, Vec<u8>>,
) -> Result<Vec<u8>> {
    match mode {
        OutputMode::Merged => merge_documents(order, pdfs),
        OutputMode::Archive => archive_documents(pdfs),
    }
}

/// Concatenate the successful PDFs into one document, in input-SKU order
/// regardless of the order the jobs finished in.
pub fn merge_documents(order: &[Sku], pdfs: &HashMap<Sku, Vec<u8>>) -> Result<Vec<u8>> {
    let mut documents = Vec::new();
    for sku in order {
        if let Some(bytes) = pdfs.get(sku) {
            let doc = Document::load_mem(bytes).map_err(|e| {
                FlyerError::Aggregation(format!("unreadable PDF for {}: {}", sku, e))
            })?;
            documents.push(doc);
        }
    }

    if documents.is_empty() {
        return Err(FlyerError::Aggregation(
            "no successful documents to merge".to_string(),
        ));
    }

    log::info!("Merging {} PDF documents", documents.len());

    // Renumber every document into one id space, then collect pages and
    // objects in input order.
    let mut max_id = 1;
    let mut all_pages: BTreeMap<ObjectId, Object> = BTreeMap::new();
    let mut all_objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for mut doc in documents {
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        for (_, object_id) in doc.get_pages() {
            let object = doc
                .get_object(object_id)
                .map_err(|e| FlyerError::Aggregation(format!("invalid page object: {}", e)))?
                .to_owned();
            all_pages.insert(object_id, object);
        }
        all_objects.extend(doc.objects.clone());
    }

    let mut merged = Document::with_version("1.5");
    let mut catalog_object: Option<(ObjectId, Object)> = None;
    let mut pages_object: Option<(ObjectId, Object)> = None;

    for (object_id, object) in all_objects {
        match object_type(&object) {
            Some(b"Catalog") => {
                // Keep the first catalog
                catalog_object.get_or_insert((object_id, object));
            }
            Some(b"Pages") => {
                // Fold every Pages dictionary into one
                if let Ok(dictionary) = object.as_dict() {
                    let mut dictionary = dictionary.clone();
                    if let Some((_, ref existing)) = pages_object {
                        if let Ok(existing) = existing.as_dict() {
                            dictionary.extend(existing);
                        }
                    }
                    let id = pages_object.map(|(id, _)| id).unwrap_or(object_id);
                    pages_object = Some((id, Object::Dictionary(dictionary)));
                }
            }
            // Page objects are re-inserted below with a fixed parent;
            // outlines are dropped
            Some(b"Page") | Some(b"Outlines") | Some(b"Outline") => {}
            _ => {
                merged.objects.insert(object_id, object);
            }
        }
    }

    let (catalog_id, catalog_object) = catalog_object
        .ok_or_else(|| FlyerError::Aggregation("no catalog found in any document".to_string()))?;
    let (pages_id, pages_object) = pages_object
        .ok_or_else(|| FlyerError::Aggregation("no page tree found in any document".to_string()))?;

    if let Ok(dictionary) = pages_object.as_dict() {
        let mut dictionary = dictionary.clone();
        dictionary.set("Count", all_pages.len() as i64);
        dictionary.set(
            "Kids",
            all_pages
                .keys()
                .map(|id| Object::Reference(*id))
                .collect::<Vec<_>>(),
        );
        merged.objects.insert(pages_id, Object::Dictionary(dictionary));
    }

    for (object_id, object) in all_pages {
        if let Ok(dictionary) = object.as_dict() {
            let mut dictionary = dictionary.clone();
            dictionary.set("Parent", pages_id);
            merged.objects.insert(object_id, Object::Dictionary(dictionary));
        }
    }

    if let Ok(dictionary) = catalog_object.as_dict() {
        let mut dictionary = dictionary.clone();
        dictionary.set("Pages", pages_id);
        dictionary.remove(b"Outlines");
        merged
            .objects
            .insert(catalog_id, Object::Dictionary(dictionary));
    }

    merged.trailer.set("Root", catalog_id);
    merged.max_id = merged.objects.len() as u32;
    merged.renumber_objects();
    merged.compress();

    let mut bytes = Vec::new();
    merged
        .save_to(&mut bytes)
        .map_err(|e| FlyerError::Aggregation(format!("failed to write merged PDF: {}", e)))?;
    Ok(bytes)
}

fn object_type(object: &Object) -> Option<&[u8]> {
    object
        .as_dict()
        .ok()
        .and_then(|dict| dict.get(b"Type").ok())
        .and_then(|value| value.as_name().ok())
}

/// Bundle the successful PDFs into one ZIP, one `flyer_<sku>.pdf` entry
/// per SKU, entries in SKU order for reproducible archives.
pub fn archive_documents(pdfs: &HashMap<Sku, Vec<u8>>) -> Result<Vec<u8>> {
    if pdfs.is_empty() {
        return Err(FlyerError::Aggregation(
            "no successful documents to archive".to_string(),
        ));
    }

    log::info!("Archiving {} PDF documents", pdfs.len());

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut buffer);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        let mut skus: Vec<&Sku> = pdfs.keys().collect();
        skus.sort();

        for sku in skus {
            writer
                .start_file(flyer_entry_name(sku), options)
                .map_err(|e| {
                    FlyerError::Aggregation(format!("failed to add archive entry: {}", e))
                })?;
            writer.write_all(&pdfs[sku]).map_err(|e| {
                FlyerError::Aggregation(format!("failed to write archive entry: {}", e))
            })?;
        }

        writer
            .finish()
            .map_err(|e| FlyerError::Aggregation(format!("failed to finish archive: {}", e)))?;
    }

    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_with_no_documents_fails() {
        let result = merge_documents(&["A".to_string()], &HashMap::new());
        assert!(matches!(result, Err(FlyerError::Aggregation(_))));
    }

    #[test]
    fn test_archive_with_no_documents_fails() {
        let result = archive_documents(&HashMap::new());
        assert!(matches!(result, Err(FlyerError::Aggregation(_))));
    }

    #[test]
    fn test_archive_entry_names() {
        let mut pdfs = HashMap::new();
        pdfs.insert("ISBN1".to_string(), b"%PDF-1.5 fake".to_vec());
        pdfs.insert("ISBN2".to_string(), b"%PDF-1.5 fake".to_vec());

        let bytes = archive_documents(&pdfs).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();

        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(names, vec!["flyer_ISBN1.pdf", "flyer_ISBN2.pdf"]);
    }

    #[test]
    fn test_merge_rejects_unreadable_pdf() {
        let mut pdfs = HashMap::new();
        pdfs.insert("BAD".to_string(), b"not a pdf at all".to_vec());
        let result = merge_documents(&["BAD".to_string()], &pdfs);
        assert!(matches!(result, Err(FlyerError::Aggregation(_))));
    }
}
