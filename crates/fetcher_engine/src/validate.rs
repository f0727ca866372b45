use crate::{RejectReason, ResponseMetadata};

/// Largest image the pipeline will accept, declared or streamed.
pub const MAX_IMAGE_BYTES: u64 = 50 * 1024 * 1024;

/// Checks response metadata before any body byte is consumed.
///
/// A missing content type or declared length is tolerated; the body stream is
/// still capped by the caller since servers may omit or misreport the length.
pub fn validate_response(
    metadata: &ResponseMetadata,
    max_bytes: u64,
) -> Result<(), RejectReason> {
    if !(200..300).contains(&metadata.status_code) {
        return Err(RejectReason::HttpStatus {
            status: metadata.status_code,
        });
    }

    if let Some(content_type) = metadata.content_type.as_deref() {
        if !is_image_content_type(content_type) {
            return Err(RejectReason::NotAnImage {
                content_type: content_type.to_string(),
            });
        }
    }

    if let Some(declared) = metadata.declared_length {
        if declared > max_bytes {
            return Err(RejectReason::DeclaredTooLarge {
                declared,
                max_bytes,
            });
        }
    }

    Ok(())
}

fn is_image_content_type(content_type: &str) -> bool {
    content_type
        .trim()
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}
