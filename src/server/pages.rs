//! HTML pages for the dashboard and the single-camera view

use std::fmt::Write;

use crate::registry::{CameraEntry, CameraRegistry};

/// Escape text for use in HTML content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Dashboard listing every camera in registry order
pub fn dashboard(registry: &CameraRegistry) -> String {
    let mut tiles = String::new();
    for entry in registry.entries() {
        let id = entry.descriptor.id;
        let status = if entry.stats().is_offline() {
            "<p style='color:#b00;'>offline</p>"
        } else {
            ""
        };
        // writing to a String cannot fail
        let _ = write!(
            tiles,
            r#"
    <div style='margin:20px; display:inline-block; text-align:center;'>
      <h3>{label}</h3>
      <a href="/video_stream/{id}">
        <img src='/video_feed/{id}' width='320' height='240' style='cursor:pointer;'/>
      </a>
      {status}
    </div>"#,
            label = escape(&entry.descriptor.label),
            id = id,
            status = status,
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html>
  <head><title>Multi-Cam Stream</title></head>
  <body>
    <h1>Multi-Camera Live Feed</h1>{tiles}
  </body>
</html>
"#,
        tiles = tiles
    )
}

/// Full-size view of one camera
pub fn camera_view(entry: &CameraEntry) -> String {
    let label = escape(&entry.descriptor.label);
    format!(
        r#"<!DOCTYPE html>
<html>
  <head><title>{label} Stream</title></head>
  <body style='text-align:center;'>
    <h1>{label}</h1>
    <img src='/video_feed/{id}' style='max-width:100%; height:auto;'/>
    <p><a href='/'>Back to all cameras</a></p>
  </body>
</html>
"#,
        label = label,
        id = entry.descriptor.id,
    )
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::capture::{CaptureConfig, CaptureError, SourceSpec};
    use crate::registry::{CameraDescriptor, CameraId};

    fn registry() -> CameraRegistry {
        let mut registry = CameraRegistry::new(CaptureConfig::default());
        registry
            .register(CameraDescriptor::new(CameraId::new(1), "Living Room"), || {
                SourceSpec::TestPattern {
                    width: 64,
                    height: 48,
                }
                .open()
            })
            .unwrap();
        registry
            .register(CameraDescriptor::new(CameraId::new(0), "Kids' <Room>"), || {
                Err(CaptureError::SourceUnavailable("absent".into()))
            })
            .unwrap();
        registry
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
        assert_eq!(escape("Bedroom"), "Bedroom");
    }

    #[test]
    fn test_dashboard_lists_cameras_in_order() {
        let registry = registry();
        let html = dashboard(&registry);

        let living = html.find("Living Room").unwrap();
        let kids = html.find("Kids&#39; &lt;Room&gt;").unwrap();
        assert!(living < kids);
        assert!(html.contains("<a href=\"/video_stream/1\">"));
        assert!(html.contains("src='/video_feed/0'"));
        assert!(!html.contains("<Room>"));
    }

    #[test]
    fn test_dashboard_marks_offline_camera() {
        let registry = registry();
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while !registry.stats(CameraId::new(0)).unwrap().is_offline() {
            assert!(std::time::Instant::now() < deadline);
            std::thread::sleep(Duration::from_millis(5));
        }

        let html = dashboard(&registry);
        assert_eq!(html.matches("offline").count(), 1);
    }

    #[test]
    fn test_camera_view() {
        let registry = registry();
        let html = camera_view(registry.get(CameraId::new(1)).unwrap());

        assert!(html.contains("<h1>Living Room</h1>"));
        assert!(html.contains("src='/video_feed/1'"));
        assert!(html.contains("<a href='/'>Back to all cameras</a>"));
    }
}
