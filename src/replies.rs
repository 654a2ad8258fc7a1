//! Fixed texts the bot sends to users.

/// Reply to `/start`, and the usage text embedded in other replies.
pub const START_MESSAGE: &str = "Send me a .doc or .docx file and I will convert it \
into a .pdf and send back to you.\n\n\
I can only download files of up to 20MB in size.";

/// Reply to any message that is not a document.
pub const NON_DOCUMENT_MESSAGE: &str = "I'm just a simple file converter bot \
and cannot process what you've sent me.\n\n\
Send me a .doc or .docx file and I will convert it \
into a .pdf and send back to you.\n\n\
I can only download files of up to 20MB in size.";

/// Sent right before the converted PDF.
pub const SENDING_NOTE: &str = "Sending you the converted file.\n\n\
Please note that the original file name might be \
slightly modified due to Telegram bot limitations.";

/// Reply when the attachment could not be fetched.
pub fn download_error(file_name: &str, error: &impl std::fmt::Display) -> String {
    format!("An error occurred while downloading the file {file_name}:\n{error}")
}

/// Reply when conversion or delivery of the PDF failed.
pub fn processing_error(error: &impl std::fmt::Display) -> String {
    format!("An error occurred while processing the file:\n{error}")
}
