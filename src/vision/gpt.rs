use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::{Value, json};
use tracing::debug;

use crate::{
    browser::session::Viewport,
    error::{Error, Result},
    utils::StripCodeBlock,
    vision::{UiElement, VisionGrounding},
};

const SYSTEM_PROMPT: &str = "You are an assistant designed to analyze UI screenshots \
and extract actionable insights. Identify the interactive UI elements visible in the \
screenshot. Respond with a JSON array only, one object per element: \
{\"label\": string, \"role\": string, \"region\": {\"x\": number, \"y\": number, \
\"width\": number, \"height\": number}}. Never include any notes or explanations.";

/// Vision grounding backed by an OpenAI-compatible chat endpoint with image
/// input. The screenshot goes up as a base64 data URL; the reply is parsed
/// as a JSON array of elements.
pub struct GptVision {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl GptVision {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    fn request_body(&self, image: &[u8], viewport: Viewport) -> Value {
        let data_url = format!("data:image/png;base64,{}", STANDARD.encode(image));
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": [
                        {
                            "type": "text",
                            "text": format!(
                                "Viewport is {}x{} CSS pixels. Analyze this screenshot and list the UI elements.",
                                viewport.width, viewport.height
                            )
                        },
                        { "type": "image_url", "image_url": { "url": data_url } }
                    ]
                }
            ]
        })
    }
}

#[async_trait]
impl VisionGrounding for GptVision {
    async fn ground(&self, image: &[u8], viewport: Viewport) -> Result<Vec<UiElement>> {
        let body = self.request_body(image, viewport);
        let response = self
            .http
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Vision(format!("request failed: {e}")))?;

        let payload: Value = response
            .json()
            .await
            .map_err(|e| Error::Vision(format!("invalid response body: {e}")))?;

        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| Error::Vision("response carried no message content".into()))?;

        debug!("vision model returned {} chars", content.len());

        let elements: Vec<UiElement> = serde_json::from_str(content.strip_code_block())
            .map_err(|e| Error::Vision(format!("unparseable element list: {e}")))?;
        Ok(elements)
    }
}
