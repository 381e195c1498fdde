//! Fixed pipeline constants

/// Notice appended when a fragment was cut to fit its budget
pub const TRUNCATION_NOTICE: &str = "[... visit our website to learn more]";

/// Entry name for one flyer inside the archive output
pub fn flyer_entry_name(sku: &str) -> String {
    format!("flyer_{}.pdf", sku)
}

/// File name for the merged output
pub const MERGED_FILE_NAME: &str = "merged_flyers.pdf";
