//! The upload control: method selector, drop zone, file picker and URL box.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    capture_drop, capture_file, capture_url, CaptureConfig, CaptureError, LocalImage, PendingQuery,
};

/// Receives each accepted query exactly once.
pub trait UploadSink {
    fn on_upload(&mut self, query: PendingQuery);
}

impl<F> UploadSink for F
where
    F: FnMut(PendingQuery),
{
    fn on_upload(&mut self, query: PendingQuery) {
        self(query)
    }
}

/// Which input the control currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMethod {
    #[default]
    File,
    Url,
}

/// Pointer events over the drop zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEvent {
    Enter,
    Over,
    Leave,
}

/// Upload control state plus the sink accepted queries are handed to.
///
/// While [`disabled`](Self::is_disabled) every event is rejected with
/// [`CaptureError::Disabled`] and the sink is left untouched.
pub struct UploadCapture<S> {
    sink: S,
    config: CaptureConfig,
    method: UploadMethod,
    drag_active: bool,
    url_input: String,
    disabled: bool,
}

impl<S: UploadSink> UploadCapture<S> {
    pub fn new(sink: S, config: CaptureConfig) -> Self {
        Self {
            sink,
            config,
            method: UploadMethod::default(),
            drag_active: false,
            url_input: String::new(),
            disabled: false,
        }
    }

    pub fn method(&self) -> UploadMethod {
        self.method
    }

    pub fn set_method(&mut self, method: UploadMethod) {
        self.method = method;
    }

    pub fn is_drag_active(&self) -> bool {
        self.drag_active
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Mirror the application's loading flag.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn url_input(&self) -> &str {
        &self.url_input
    }

    pub fn set_url_input(&mut self, input: impl Into<String>) {
        self.url_input = input.into();
    }

    /// The URL submit button is enabled only for a non-blank input while idle.
    pub fn can_submit_url(&self) -> bool {
        !self.disabled && !self.url_input.trim().is_empty()
    }

    pub fn drag(&mut self, event: DragEvent) {
        self.drag_active = match event {
            DragEvent::Enter | DragEvent::Over => true,
            DragEvent::Leave => false,
        };
    }

    /// Handle a drop; only the first item is considered.
    pub fn drop_files(&mut self, items: &[LocalImage]) -> Result<(), CaptureError> {
        self.drag_active = false;
        self.ensure_enabled()?;
        let query = capture_drop(items, &self.config)?;
        self.emit(query);
        Ok(())
    }

    /// Handle a file-picker selection.
    pub fn select_file(&mut self, path: &Path) -> Result<(), CaptureError> {
        self.ensure_enabled()?;
        let query = capture_file(path, &self.config)?;
        self.emit(query);
        Ok(())
    }

    /// Submit the URL box. Only acts when the URL method is selected.
    pub fn submit(&mut self) -> Result<bool, CaptureError> {
        if self.method != UploadMethod::Url {
            return Ok(false);
        }
        self.ensure_enabled()?;
        let query = capture_url(&self.url_input)?;
        self.emit(query);
        Ok(true)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn ensure_enabled(&self) -> Result<(), CaptureError> {
        if self.disabled {
            Err(CaptureError::Disabled)
        } else {
            Ok(())
        }
    }

    fn emit(&mut self, query: PendingQuery) {
        tracing::debug!(kind = ?query.kind(), source = %query.describe(), "captured query");
        self.sink.on_upload(query);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QueryKind;
    use std::io::Write;

    #[derive(Default)]
    struct Recorder(Vec<PendingQuery>);

    impl UploadSink for Recorder {
        fn on_upload(&mut self, query: PendingQuery) {
            self.0.push(query);
        }
    }

    fn collecting() -> UploadCapture<Recorder> {
        UploadCapture::new(Recorder::default(), CaptureConfig::default())
    }

    fn image_on_disk(dir: &tempfile::TempDir, name: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&[0x89, b'P', b'N', b'G']).unwrap();
        path
    }

    #[test]
    fn drag_state_follows_events() {
        let mut control = collecting();
        control.drag(DragEvent::Enter);
        assert!(control.is_drag_active());
        control.drag(DragEvent::Over);
        assert!(control.is_drag_active());
        control.drag(DragEvent::Leave);
        assert!(!control.is_drag_active());
    }

    #[test]
    fn drop_of_image_emits_once_and_clears_drag() {
        let dir = tempfile::tempdir().unwrap();
        let path = image_on_disk(&dir, "shoe.png");
        let mut control = collecting();
        control.drag(DragEvent::Enter);

        control
            .drop_files(&[LocalImage::new(&path), LocalImage::new(&path)])
            .unwrap();

        assert!(!control.is_drag_active());
        assert_eq!(control.sink().0.len(), 1);
        assert_eq!(control.sink().0[0].kind(), QueryKind::File);
    }

    #[test]
    fn drop_of_non_image_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = image_on_disk(&dir, "notes.txt");
        let mut control = collecting();

        let err = control.drop_files(&[LocalImage::new(&path)]).unwrap_err();
        assert!(matches!(err, CaptureError::NotAnImage { .. }));
        assert!(control.sink().0.is_empty());
    }

    #[test]
    fn disabled_control_never_reaches_the_sink() {
        let dir = tempfile::tempdir().unwrap();
        let path = image_on_disk(&dir, "shoe.png");
        let mut control = collecting();
        control.set_disabled(true);
        control.set_method(UploadMethod::Url);
        control.set_url_input("https://example.com/a.jpg");

        assert_eq!(control.select_file(&path), Err(CaptureError::Disabled));
        assert_eq!(
            control.drop_files(&[LocalImage::new(&path)]),
            Err(CaptureError::Disabled)
        );
        assert_eq!(control.submit(), Err(CaptureError::Disabled));
        assert!(!control.can_submit_url());
        assert!(control.sink().0.is_empty());
    }

    #[test]
    fn url_submit_requires_url_method_and_text() {
        let mut control = collecting();
        control.set_url_input("  https://example.com/a.jpg ");
        assert_eq!(control.submit(), Ok(false));

        control.set_method(UploadMethod::Url);
        control.set_url_input("   ");
        assert!(!control.can_submit_url());
        assert_eq!(control.submit(), Err(CaptureError::EmptyUrl));

        control.set_url_input("  https://example.com/a.jpg ");
        assert_eq!(control.submit(), Ok(true));

        let sink = control.into_sink().0;
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].preview_url(), "https://example.com/a.jpg");
    }

    #[test]
    fn closures_are_sinks() {
        let mut seen = 0;
        {
            let mut control =
                UploadCapture::new(|_q: PendingQuery| seen += 1, CaptureConfig::default());
            control.set_method(UploadMethod::Url);
            control.set_url_input("https://example.com/x.png");
            control.submit().unwrap();
        }
        assert_eq!(seen, 1);
    }
}
