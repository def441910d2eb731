use std::sync::Arc;
use std::time::Duration;

use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    error::OsError,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{Window, WindowId},
};

use crate::config::WindowConfig;

/// Events the engine reacts to after a pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformEvent {
    /// Framebuffer size changed (physical pixels).
    Resized { width: u32, height: u32 },
    CloseRequested,
}

/// Window state driven by the winit event loop.
///
/// The window is created lazily in `resumed`, which winit delivers on the
/// first pump.
pub struct Platform {
    config: WindowConfig,
    window: Option<Arc<Window>>,
    creation_error: Option<OsError>,
    events: Vec<PlatformEvent>,
    close_requested: bool,
}

impl Platform {
    pub fn new(config: WindowConfig) -> Self {
        Self {
            config,
            window: None,
            creation_error: None,
            events: Vec::new(),
            close_requested: false,
        }
    }

    pub fn window(&self) -> Option<&Arc<Window>> {
        self.window.as_ref()
    }

    pub fn take_creation_error(&mut self) -> Option<OsError> {
        self.creation_error.take()
    }

    pub fn close_requested(&self) -> bool {
        self.close_requested
    }

    /// Drains events gathered since the last call, in arrival order.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, PlatformEvent> {
        self.events.drain(..)
    }

    /// Runs one non-blocking pass over the OS event queue.
    pub fn pump(&mut self, event_loop: &mut EventLoop<()>) {
        if let PumpStatus::Exit(code) = event_loop.pump_app_events(Some(Duration::ZERO), self) {
            log::debug!("event loop exited with code {code}");
            self.request_close();
        }
    }

    /// Drops the window. Subsequent pumps see no window events.
    pub fn destroy_window(&mut self) {
        self.window = None;
        self.events.clear();
    }

    /// Marks the window for closing, as if the user had closed it.
    pub fn request_close(&mut self) {
        if !self.close_requested {
            self.close_requested = true;
            self.events.push(PlatformEvent::CloseRequested);
        }
    }

    fn push_resize(&mut self, width: u32, height: u32) {
        self.events.push(PlatformEvent::Resized { width, height });
    }
}

impl ApplicationHandler for Platform {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height))
            .with_resizable(self.config.resizable);

        match event_loop.create_window(attrs) {
            Ok(window) => {
                event_loop.set_control_flow(ControlFlow::Poll);
                self.window = Some(Arc::new(window));
            }
            Err(err) => {
                log::error!("failed to create window: {err}");
                self.creation_error = Some(err);
            }
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.window.as_ref().map(|w| w.id()) != Some(window_id) {
            return;
        }

        match platform_event(&event) {
            Some(PlatformEvent::Resized { width, height }) => self.push_resize(width, height),
            Some(PlatformEvent::CloseRequested) => self.request_close(),
            None => {}
        }
    }
}

/// Maps the winit events the engine cares about.
///
/// `ScaleFactorChanged` is not mapped: winit follows it with a `Resized`
/// carrying the new physical size.
fn platform_event(event: &WindowEvent) -> Option<PlatformEvent> {
    match event {
        WindowEvent::Resized(size) => Some(PlatformEvent::Resized {
            width: size.width,
            height: size.height,
        }),
        WindowEvent::CloseRequested | WindowEvent::Destroyed => Some(PlatformEvent::CloseRequested),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use winit::dpi::PhysicalSize;

    use super::*;

    #[test]
    fn resize_carries_physical_size() {
        assert_eq!(
            platform_event(&WindowEvent::Resized(PhysicalSize::new(1600, 900))),
            Some(PlatformEvent::Resized {
                width: 1600,
                height: 900
            })
        );
        assert_eq!(
            platform_event(&WindowEvent::Resized(PhysicalSize::new(0, 0))),
            Some(PlatformEvent::Resized {
                width: 0,
                height: 0
            })
        );
    }

    #[test]
    fn close_and_destroy_request_close() {
        assert_eq!(
            platform_event(&WindowEvent::CloseRequested),
            Some(PlatformEvent::CloseRequested)
        );
        assert_eq!(
            platform_event(&WindowEvent::Destroyed),
            Some(PlatformEvent::CloseRequested)
        );
    }

    #[test]
    fn unrelated_events_are_ignored() {
        assert_eq!(platform_event(&WindowEvent::Focused(true)), None);
        assert_eq!(platform_event(&WindowEvent::RedrawRequested), None);
    }

    #[test]
    fn close_is_queued_once() {
        let mut platform = Platform::new(WindowConfig::default());
        platform.request_close();
        platform.request_close();

        assert!(platform.close_requested());
        let events: Vec<_> = platform.drain_events().collect();
        assert_eq!(events, vec![PlatformEvent::CloseRequested]);
        assert_eq!(platform.drain_events().count(), 0);
    }
}
