use crate::capability::WidgetChrome;
use crate::render::{DrawContext, FrameBuffer, Rect, RenderError, Theme};

#[test]
fn test_draw_frame_returns_inner_area() {
    let theme = Theme::default_theme();
    let mut buffer = FrameBuffer::new(12, 4);
    let chrome = WidgetChrome::new("Clock");
    let area = Rect::new(0, 0, 12, 4);

    let inner = {
        let mut ctx = DrawContext::new(&mut buffer, &theme, area, false);
        chrome.draw_frame(&mut ctx, area)
    };
    assert_eq!(inner, Rect::new(1, 1, 10, 2));
    assert_eq!(buffer.row_text(0), "┌─ Clock ──┐");
    assert_eq!(buffer.row_text(3), "└──────────┘");
}

#[test]
fn test_error_placeholder_replaces_body() {
    let theme = Theme::default_theme();
    let mut buffer = FrameBuffer::new(20, 3);
    let mut chrome = WidgetChrome::new("");
    chrome.set_error("offline");
    assert!(chrome.has_error());

    let area = Rect::new(0, 0, 20, 3);
    let mut body_ran = false;
    {
        let mut ctx = DrawContext::new(&mut buffer, &theme, area, false);
        chrome
            .draw_with(&mut ctx, area, |_, _| {
                body_ran = true;
                Ok::<(), RenderError>(())
            })
            .unwrap();
    }
    assert!(!body_ran);
    assert!(buffer.row_text(1).contains("Error: offline"));

    chrome.clear_error();
    assert!(chrome.error().is_none());
}
