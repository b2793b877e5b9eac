use crate::consts::{endpoints, Lang};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("HTTP: {0}")] Http(#[from] reqwest::Error),
    #[error("Status: {0}")] Status(StatusCode),
    #[error("Malformed response")] Malformed,
}

/// Outcome of a translation attempt. `translated == false` means `text` is the
/// caller's original input, either because it was blank or because the
/// translator failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
    pub translated: bool,
}

impl Translation {
    fn untouched(text: &str) -> Self {
        Self { text: text.to_string(), translated: false }
    }
}

#[async_trait]
pub trait Translate: Send + Sync {
    /// Single attempt against the backing service.
    async fn translate_raw(&self, text: &str, source: Lang, target: Lang) -> Result<String, TranslateError>;

    /// Never fails: blank input is returned as-is without calling out, and any
    /// error is logged and replaced by the original text.
    async fn translate(&self, text: &str, source: Lang, target: Lang) -> Translation {
        if text.trim().is_empty() {
            return Translation::untouched(text);
        }
        match self.translate_raw(text, source, target).await {
            Ok(translated) => Translation { text: translated, translated: true },
            Err(e) => {
                log::error!("Translation error ({}->{}): {}", source, target, e);
                Translation::untouched(text)
            }
        }
    }
}

/// Client for the public Google Translate `gtx` endpoint.
pub struct GoogleTranslator {
    client: Client,
    base_url: String,
}

impl GoogleTranslator {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self { client, base_url: base_url.into().trim_end_matches('/').to_string() }
    }
}

#[async_trait]
impl Translate for GoogleTranslator {
    async fn translate_raw(&self, text: &str, source: Lang, target: Lang) -> Result<String, TranslateError> {
        translate_text(&self.client, &self.base_url, text, source, target).await
    }
}

pub async fn translate_text(
    client: &Client,
    base_url: &str,
    text: &str,
    source: Lang,
    target: Lang,
) -> Result<String, TranslateError> {
    let url = format!("{}{}", base_url, endpoints::TRANSLATE);

    let params = [
        ("client", "gtx"),
        ("sl", source.code()),
        ("tl", target.code()),
        ("dt", "t"), // return translation only
        ("q", text),
    ];

    let response = client.get(&url).query(&params).send().await?;

    if !response.status().is_success() {
        return Err(TranslateError::Status(response.status()));
    }

    let raw_json: serde_json::Value = response.json().await?;
    let translated = join_sentences(&raw_json).ok_or(TranslateError::Malformed)?;

    if translated.trim().is_empty() {
        return Err(TranslateError::Malformed);
    }
    Ok(translated)
}

/// The response is a nested array: [[["Translated", "Original", ...], ...], ...].
/// Long inputs come back split into several sentence entries.
fn join_sentences(raw: &serde_json::Value) -> Option<String> {
    let sentences = raw.get(0)?.as_array()?;
    let mut out = String::new();
    for sentence in sentences {
        if let Some(part) = sentence.get(0).and_then(|v| v.as_str()) {
            out.push_str(part);
        }
    }
    Some(out)
}


#[cfg(test)]
mod tests {
    use super::testing::FakeTranslator;
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn blank_input_skips_the_service() {
        let fake = FakeTranslator::default();
        for input in ["", "   ", "\n\t"] {
            let out = fake.translate(input, Lang::Pt, Lang::En).await;
            assert_eq!(out.text, input);
            assert!(!out.translated);
        }
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn failure_returns_exact_original() {
        let fake = FakeTranslator::default();
        let out = fake.translate("bolo de chocolate", Lang::Pt, Lang::En).await;
        assert_eq!(out, Translation { text: "bolo de chocolate".into(), translated: false });
        assert_eq!(fake.calls(), 1);
    }

    #[tokio::test]
    async fn google_translator_parses_sentences() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .and(query_param("sl", "pt"))
            .and(query_param("tl", "en"))
            .and(query_param("q", "frango. arroz."))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                [["chicken. ", "frango. ", null, null], ["rice.", "arroz.", null, null]],
                null,
                "pt"
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let translator = GoogleTranslator::new(Client::new(), server.uri());
        let out = translator.translate("frango. arroz.", Lang::Pt, Lang::En).await;

        assert!(out.translated);
        assert_eq!(out.text, "chicken. rice.");
    }

    #[tokio::test]
    async fn google_translator_falls_back_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let translator = GoogleTranslator::new(Client::new(), server.uri());
        let raw = translator.translate_raw("frango", Lang::Pt, Lang::En).await;
        assert!(matches!(raw, Err(TranslateError::Status(s)) if s.as_u16() == 503));

        let out = translator.translate("frango", Lang::Pt, Lang::En).await;
        assert_eq!(out.text, "frango");
        assert!(!out.translated);
    }

    #[tokio::test]
    async fn empty_translation_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([[], null, "en"])))
            .mount(&server)
            .await;

        let translator = GoogleTranslator::new(Client::new(), server.uri());
        let raw = translator.translate_raw("salt", Lang::En, Lang::Pt).await;
        assert!(matches!(raw, Err(TranslateError::Malformed)));
    }
}
