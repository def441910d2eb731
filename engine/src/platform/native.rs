use std::ffi::c_void;

use raw_window_handle::{
    HandleError, HasDisplayHandle, HasWindowHandle, RawDisplayHandle, RawWindowHandle,
};

/// OS-specific window handle, as a rendering library expects to receive it.
///
/// `window` is the native window/view; the second field is the display
/// connection on platforms that need one (X11, Wayland) and absent elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeWindow {
    Win32 { hwnd: isize },
    AppKit { ns_view: *mut c_void },
    Xlib { window: u64, display: Option<*mut c_void> },
    Xcb { window: u32, connection: Option<*mut c_void> },
    Wayland { surface: *mut c_void, display: Option<*mut c_void> },
    Unsupported,
}

impl NativeWindow {
    /// Reads the native handle pair from anything that exposes one (a winit
    /// `Window`, typically).
    pub fn from_window<W>(window: &W) -> Result<Self, HandleError>
    where
        W: HasWindowHandle + HasDisplayHandle + ?Sized,
    {
        let window_handle = window.window_handle()?.as_raw();
        let display_handle = window.display_handle()?.as_raw();
        Ok(Self::from_raw(window_handle, display_handle))
    }

    pub fn from_raw(window: RawWindowHandle, display: RawDisplayHandle) -> Self {
        match window {
            RawWindowHandle::Win32(h) => NativeWindow::Win32 { hwnd: h.hwnd.get() },
            RawWindowHandle::AppKit(h) => NativeWindow::AppKit {
                ns_view: h.ns_view.as_ptr(),
            },
            RawWindowHandle::Xlib(h) => {
                let display = match display {
                    RawDisplayHandle::Xlib(d) => d.display.map(|p| p.as_ptr()),
                    _ => None,
                };
                NativeWindow::Xlib {
                    window: h.window as u64,
                    display,
                }
            }
            RawWindowHandle::Xcb(h) => {
                let connection = match display {
                    RawDisplayHandle::Xcb(d) => d.connection.map(|p| p.as_ptr()),
                    _ => None,
                };
                NativeWindow::Xcb {
                    window: h.window.get(),
                    connection,
                }
            }
            RawWindowHandle::Wayland(h) => {
                let display = match display {
                    RawDisplayHandle::Wayland(d) => Some(d.display.as_ptr()),
                    _ => None,
                };
                NativeWindow::Wayland {
                    surface: h.surface.as_ptr(),
                    display,
                }
            }
            _ => NativeWindow::Unsupported,
        }
    }

    /// Short platform name, used in log lines.
    pub fn platform(&self) -> &'static str {
        match self {
            NativeWindow::Win32 { .. } => "win32",
            NativeWindow::AppKit { .. } => "appkit",
            NativeWindow::Xlib { .. } => "xlib",
            NativeWindow::Xcb { .. } => "xcb",
            NativeWindow::Wayland { .. } => "wayland",
            NativeWindow::Unsupported => "unsupported",
        }
    }

    /// Whether the handle carries the display connection its platform needs.
    pub fn has_display(&self) -> bool {
        match self {
            NativeWindow::Xlib { display, .. } => display.is_some(),
            NativeWindow::Xcb { connection, .. } => connection.is_some(),
            NativeWindow::Wayland { display, .. } => display.is_some(),
            NativeWindow::Win32 { .. } | NativeWindow::AppKit { .. } => true,
            NativeWindow::Unsupported => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::num::{NonZeroIsize, NonZeroU32};
    use std::ptr::NonNull;

    use raw_window_handle::{
        AppKitWindowHandle, WaylandDisplayHandle, WaylandWindowHandle, Win32WindowHandle,
        WindowsDisplayHandle, XcbDisplayHandle, XcbWindowHandle, XlibDisplayHandle,
        XlibWindowHandle,
    };

    use super::*;

    fn fake_ptr(addr: usize) -> NonNull<c_void> {
        NonNull::new(addr as *mut c_void).unwrap()
    }

    #[test]
    fn win32_has_no_display() {
        let hwnd = NonZeroIsize::new(0x1234).unwrap();
        let native = NativeWindow::from_raw(
            RawWindowHandle::Win32(Win32WindowHandle::new(hwnd)),
            RawDisplayHandle::Windows(WindowsDisplayHandle::new()),
        );
        assert_eq!(native, NativeWindow::Win32 { hwnd: 0x1234 });
        assert_eq!(native.platform(), "win32");
        assert!(native.has_display());
    }

    #[test]
    fn appkit_uses_ns_view() {
        let native = NativeWindow::from_raw(
            RawWindowHandle::AppKit(AppKitWindowHandle::new(fake_ptr(0x40))),
            RawDisplayHandle::AppKit(raw_window_handle::AppKitDisplayHandle::new()),
        );
        assert_eq!(
            native,
            NativeWindow::AppKit {
                ns_view: 0x40 as *mut c_void
            }
        );
    }

    #[test]
    fn xlib_pairs_window_with_display() {
        let native = NativeWindow::from_raw(
            RawWindowHandle::Xlib(XlibWindowHandle::new(77)),
            RawDisplayHandle::Xlib(XlibDisplayHandle::new(Some(fake_ptr(0x80)), 0)),
        );
        assert_eq!(
            native,
            NativeWindow::Xlib {
                window: 77,
                display: Some(0x80 as *mut c_void),
            }
        );
        assert!(native.has_display());
    }

    #[test]
    fn xlib_with_mismatched_display_has_none() {
        let native = NativeWindow::from_raw(
            RawWindowHandle::Xlib(XlibWindowHandle::new(77)),
            RawDisplayHandle::Windows(WindowsDisplayHandle::new()),
        );
        assert_eq!(
            native,
            NativeWindow::Xlib {
                window: 77,
                display: None,
            }
        );
        assert!(!native.has_display());
    }

    #[test]
    fn xcb_pairs_window_with_connection() {
        let native = NativeWindow::from_raw(
            RawWindowHandle::Xcb(XcbWindowHandle::new(NonZeroU32::new(9).unwrap())),
            RawDisplayHandle::Xcb(XcbDisplayHandle::new(Some(fake_ptr(0x90)), 0)),
        );
        assert_eq!(native.platform(), "xcb");
        assert!(native.has_display());
    }

    #[test]
    fn wayland_pairs_surface_with_display() {
        let native = NativeWindow::from_raw(
            RawWindowHandle::Wayland(WaylandWindowHandle::new(fake_ptr(0x10))),
            RawDisplayHandle::Wayland(WaylandDisplayHandle::new(fake_ptr(0x20))),
        );
        assert_eq!(
            native,
            NativeWindow::Wayland {
                surface: 0x10 as *mut c_void,
                display: Some(0x20 as *mut c_void),
            }
        );
    }

    #[test]
    fn other_platforms_are_unsupported() {
        let native = NativeWindow::from_raw(
            RawWindowHandle::Web(raw_window_handle::WebWindowHandle::new(1)),
            RawDisplayHandle::Web(raw_window_handle::WebDisplayHandle::new()),
        );
        assert_eq!(native, NativeWindow::Unsupported);
        assert!(!native.has_display());
    }
}
