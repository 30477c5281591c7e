//! Fixed prompt templates sent to the generative model.

/// Separator used when several iterative prompts are analysed together.
pub const PROMPT_HISTORY_SEPARATOR: &str = " | ";

/// Join the prompts of successive generations into one analysis input.
pub fn join_prompt_history(history: &[String]) -> String {
    history.join(PROMPT_HISTORY_SEPARATOR)
}

/// Frame a user's enhancement request in terms of the project being edited.
pub fn frame_enhancement(enhancement: &str, project_title: &str) -> String {
    format!(
        "{}. Enhance this {} design by integrating these improvements while maintaining \
         the original architectural character and composition as close as possible.",
        enhancement.trim(),
        project_title.trim()
    )
}

/// Instructional prompt for editing the supplied reference image.
pub fn image_enhancement_prompt(framed: &str) -> String {
    format!(
        "I have provided you with an original architectural/urban design image as reference. \
Please create an enhanced version that incorporates these specific improvements: {framed}

CRITICAL INSTRUCTIONS:
- STUDY the provided original image carefully and use it as your primary reference
- MAINTAIN the exact same viewpoint, perspective, and composition as the original
- PRESERVE all existing architectural elements, buildings, and landscape features
- SEAMLESSLY INTEGRATE the new enhancements while keeping the original design intact
- The result should look like a natural evolution of the original, not a completely new design
- Keep the same lighting conditions, time of day, and overall atmosphere
- Add the requested improvements ({framed}) in a way that complements the existing design
- Ensure photorealistic quality with proper scale, materials, and environmental context
- Include people for scale and add detailed textures where appropriate

Remember: This is an ENHANCEMENT of the provided image, not a new creation from scratch."
    )
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

const STATUS_RULES: &str = "The \"status\" must be one of three exact strings:
1. \"Check\": The idea clearly complies with the limitation.
2. \"Depending\": It's unclear or could potentially conflict with the limitation; it requires human review.
3. \"Violation\": The idea almost certainly violates the limitation.

The \"reasoning\" must be a concise, 1-2 sentence explanation for your status choice, written in simple terms.";

/// Prompt asking for a per-limitation classification only.
pub fn reality_check_prompt(idea: &str, limitations: &[String]) -> String {
    format!(
        "You are an AI assistant for a civic engagement platform. Your task is to analyze a user's idea against a list of project limitations.

User's Idea: \"{idea}\"

Project Limitations:
{limits}

For EACH limitation, determine if the user's idea complies. Your response MUST be a single JSON object with a key \"results\" which is an array. Each object in the array must have three string keys: \"limitation\", \"status\", and \"reasoning\". Copy each limitation text exactly as given.

{STATUS_RULES}

Example response format:
```json
{{
  \"results\": [
    {{
      \"limitation\": \"Must not exceed a budget of $100,000.\",
      \"status\": \"Depending\",
      \"reasoning\": \"The idea of a 'large water feature' could have significant costs. A detailed budget would be needed to confirm compliance.\"
    }}
  ]
}}
```",
        limits = bullet_list(limitations),
    )
}

/// Prompt asking for the reality check plus a suggested title and description.
pub fn idea_analysis_prompt(
    idea: &str,
    limitations: &[String],
    project_title: &str,
    project_description: &str,
) -> String {
    format!(
        "You are an AI assistant for a civic engagement platform focused on real-world urban planning. The user's ideas are proposals for PHYSICAL changes to a location like a park, building, or public space.

Here is the context for the project of the physical space the user is submitting an idea for:
- Project Title: \"{project_title}\"
- Project Description: \"{project_description}\"

Perform the following two tasks based on the user's idea and the project limitations:
1. For EACH project limitation, analyze if the user's idea complies with it.
2. Generate a suitable title and a concise description for the idea.

User's Idea: \"{idea}\"

Project Limitations:
{limits}

Your entire response MUST be a single JSON object inside a markdown code block.
The JSON object must have three top-level keys: \"title\", \"description\", and \"realityCheck\".

- \"title\": A string, maximum 5 words acting as a simple way to name the idea for the project.
- \"description\": A string, 1-3 sentences summarizing the idea, from the perspective of someone using the platform to submit their idea and convince others.
- \"realityCheck\": An array of objects. Each object must have \"limitation\" (string, copied exactly), \"status\" (string), and \"reasoning\" (string, 1-2 sentences).

{STATUS_RULES}

Example response format:
```json
{{
  \"title\": \"A Creative Title Here\",
  \"description\": \"A summary of the enhancement.\",
  \"realityCheck\": [
    {{
      \"limitation\": \"Must not exceed a budget of $100,000.\",
      \"status\": \"Depending\",
      \"reasoning\": \"The idea of a 'large water feature' could have significant costs. A detailed budget would be needed to confirm compliance.\"
    }}
  ]
}}
```",
        limits = if limitations.is_empty() {
            "- (none)".to_string()
        } else {
            bullet_list(limitations)
        },
    )
}

/// Prompt asking only for a title and description.
pub fn details_prompt(idea: &str) -> String {
    format!(
        "Analyze the user's idea and generate a creative title and a concise description.

User's Idea: \"{idea}\"

Your entire response MUST be a single JSON object inside a markdown code block.
The JSON object must have two string keys: \"title\" and \"description\".

The title should be max. 5 words.
The description should be around 1-4 sentences, quickly summarizing the idea in understandable words from the perspective of telling someone else what the idea is about.

Example response:
```json
{{
  \"title\": \"A Creative Title Here\",
  \"description\": \"A summary of the enhancement.\"
}}
```"
    )
}
