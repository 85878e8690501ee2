//! Endpoints under `/public`.

use std::path::Path;

use serde_json::json;

use crate::envelope::Payload;
use crate::error::{AlistError, Result};
use crate::http::MultipartForm;
use crate::request::RequestOptions;
use crate::session::Session;
use crate::setting::{Setting, SettingValue};
use crate::transport::Transport;

const ENDPOINT: &str = "/public";

/// Page of a directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub num: u32,
    pub size: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self { num: 1, size: 30 }
    }
}

pub struct Public<'a, T> {
    session: &'a mut Session<T>,
}

impl<'a, T: Transport> Public<'a, T> {
    pub(crate) fn new(session: &'a mut Session<T>) -> Self {
        Self { session }
    }

    /// List `path`: its own attributes plus one page of children.
    pub fn path(&mut self, path: &str, password: Option<&str>, page: Page) -> Result<Payload> {
        let body = json!({
            "path": path,
            "password": password,
            "page_num": page.num,
            "page_size": page.size,
        });
        self.session.post(&format!("{ENDPOINT}/path"), RequestOptions::json(body))
    }

    /// Preview URL of a file.
    pub fn preview(&mut self, path: &str) -> Result<Payload> {
        self.session
            .post(&format!("{ENDPOINT}/preview"), RequestOptions::json(json!({ "path": path })))
    }

    /// Search below `path`. The server must have `enable search` on.
    pub fn search(&mut self, path: &str, keyword: &str) -> Result<Payload> {
        self.session.post(
            &format!("{ENDPOINT}/search"),
            RequestOptions::json(json!({ "path": path, "keyword": keyword })),
        )
    }

    /// Upload local files into `path`.
    ///
    /// Guests need a meta with `upload` enabled on the target path.
    pub fn upload<P: AsRef<Path>>(&mut self, files: &[P], path: &str, password: Option<&str>) -> Result<Payload> {
        let mut form = MultipartForm::new();
        for file in files {
            let file = file.as_ref();
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.display().to_string());
            form = form.file("files", &name, std::fs::read(file)?);
        }
        form = form.text("path", path);
        if let Some(password) = password {
            form = form.text("password", password);
        }
        self.session.post(&format!("{ENDPOINT}/upload"), RequestOptions::multipart(form))
    }

    /// Settings visible without logging in.
    pub fn settings(&mut self) -> Result<Vec<Setting>> {
        let settings: Option<Vec<Setting>> = self
            .session
            .get(&format!("{ENDPOINT}/settings"), RequestOptions::new())?
            .into_data("setting list")?;
        Ok(settings.unwrap_or_default())
    }

    pub fn setting(&mut self, key: &str) -> Result<Setting> {
        self.settings()?
            .into_iter()
            .find(|s| s.key() == key)
            .ok_or_else(|| AlistError::not_found("setting", key))
    }

    pub fn setting_value(&mut self, key: &str) -> Result<SettingValue> {
        Ok(self.setting(key)?.typed_value())
    }
}
