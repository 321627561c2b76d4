//! Fixed instructions sent to the model and messages shown to the user.

/// System instruction for every chat session.
pub const GARDENING_SYSTEM_INSTRUCTION: &str = "You are an expert gardening assistant named GreenThumb. You provide helpful, accurate, and encouraging advice about plants, gardening, soil health, and pest control. Keep answers concise but informative.";

/// Instruction paired with an uploaded photo.
pub const PLANT_IDENTIFICATION_PROMPT: &str = "Identify this plant. Provide its common name, scientific name, and a brief guide on how to care for it (water, light, soil). Format the output in Markdown.";

/// Substituted when a chat reply comes back without text.
pub const EMPTY_CHAT_REPLY: &str = "I couldn't generate a response. Please try again.";

/// Substituted when an analysis comes back without text.
pub const EMPTY_ANALYSIS_REPLY: &str = "Could not analyze the image.";

/// Body of the error turn appended when a chat send fails.
pub const CHAT_FAILURE_MESSAGE: &str =
    "Sorry, I had trouble connecting to the garden network. Please check your API Key or try again.";

/// Shown when an upload exceeds the size ceiling.
pub const IMAGE_TOO_LARGE_MESSAGE: &str =
    "Image size too large. Please choose an image under 10MB.";

/// Shown when an upload cannot be decoded or re-encoded.
pub const IMAGE_PROCESSING_FAILURE_MESSAGE: &str =
    "Failed to process image. Please try a different photo.";

/// Shown when the analysis call fails.
pub const ANALYSIS_FAILURE_MESSAGE: &str = "Failed to analyze image. Please try again.";
