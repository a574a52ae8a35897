use clap::Parser;
use iced::{
    keyboard,
    widget::{
        button, column, container, horizontal_space, image as img, row, scrollable, text, Column,
        Space,
    },
    window, Element, Length, Size, Subscription, Task, Theme,
};
use pagewise_core::{Document, Key, Modifiers, Viewer, ViewerConfig, ViewerEvent, ZoomMode};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod pdf_viewer;
mod renderer;
mod viewport;

use pdf_viewer::PageImages;
use renderer::{PdfiumBackend, PdfiumDocument};
use viewport::ScrollState;

const DEFAULT_LOG_FILTER: &str = "pagewise_viewer=debug,pagewise_core=debug,info";
const INITIAL_WINDOW: Size = Size::new(1024.0, 768.0);
// Toolbar and status bar, subtracted from the window to estimate the page area.
const CHROME_HEIGHT: f32 = 96.0;

#[derive(Parser, Debug)]
#[command(name = "pagewise", version, about = "View PDF documents page by page")]
struct Args {
    /// PDF file to open
    path: Option<PathBuf>,

    /// JSON file with viewer settings
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    config.validate()?;

    let backend = PdfiumBackend::new()?;
    let mut app = PdfViewer::new(config, backend);
    if let Some(path) = &args.path {
        app.open(path);
    }

    iced::application(PdfViewer::title, PdfViewer::update, PdfViewer::view)
        .subscription(PdfViewer::subscription)
        .theme(|_| Theme::Dark)
        .window_size(INITIAL_WINDOW)
        .run_with(move || app.start())?;
    Ok(())
}

#[derive(Debug, Clone)]
enum Message {
    Scrolled(scrollable::Viewport),
    WindowResized(Size),
    KeyPressed(keyboard::Key, keyboard::Modifiers),
    PreviousPage,
    NextPage,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    FitWidth,
    FitPage,
}

struct PdfViewer {
    backend: PdfiumBackend,
    viewer: Viewer<PdfiumDocument, ScrollState>,
    images: PageImages,
    status: String,
}

impl PdfViewer {
    fn new(config: ViewerConfig, backend: PdfiumBackend) -> Self {
        let display = ScrollState::new(
            INITIAL_WINDOW.width as u32,
            (INITIAL_WINDOW.height - CHROME_HEIGHT) as u32,
        );
        Self {
            backend,
            viewer: Viewer::new(config, display),
            images: PageImages::new(),
            status: "Open a PDF document to get started".to_string(),
        }
    }

    fn open(&mut self, path: &Path) {
        match self.viewer.open(&self.backend, path) {
            Ok(()) => {
                self.images.clear();
                self.status = format!("Opened {}", path.display());
            }
            Err(e) => {
                self.status = format!("Failed to open {}: {}", path.display(), e);
            }
        }
    }

    fn start(mut self) -> (Self, Task<Message>) {
        let task = self.after_update();
        (self, task)
    }

    fn title(&self) -> String {
        match self.viewer.document().and_then(|document| document.title()) {
            Some(title) => format!("{} - Pagewise", title),
            None => "Pagewise".to_string(),
        }
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Scrolled(viewport) => {
                let resized = self.viewer.display_mut().sync(&viewport);
                if resized {
                    self.viewer.on_resize();
                }
                self.viewer.on_scroll_changed();
            }
            Message::WindowResized(size) => {
                let height = (size.height - CHROME_HEIGHT).max(0.0);
                if self
                    .viewer
                    .display_mut()
                    .resize(size.width as u32, height as u32)
                {
                    self.viewer.on_resize();
                }
            }
            Message::KeyPressed(key, modifiers) => {
                if let Some(key) = map_key(&key) {
                    self.viewer.handle_key(key, map_modifiers(modifiers));
                }
            }
            Message::PreviousPage => {
                self.viewer.go_to_previous_page();
            }
            Message::NextPage => {
                self.viewer.go_to_next_page();
            }
            Message::ZoomIn => {
                self.viewer.zoom_in();
            }
            Message::ZoomOut => {
                self.viewer.zoom_out();
            }
            Message::ZoomReset => {
                self.viewer.zoom_reset();
            }
            Message::FitWidth => {
                self.viewer.zoom_fit_width();
            }
            Message::FitPage => {
                self.viewer.zoom_fit_page();
            }
        }
        self.after_update()
    }

    /// Pick up new renders, surface viewer events and forward scroll requests.
    fn after_update(&mut self) -> Task<Message> {
        self.images.sync(self.viewer.page_manager());

        for event in self.viewer.take_events() {
            self.status = match event {
                ViewerEvent::CurrentPageChanged(index) => {
                    format!("Page {} of {}", index + 1, self.viewer.page_count())
                }
                ViewerEvent::ZoomChanged { factor, mode } => {
                    format!("Zoom {:.0}% ({})", factor * 100.0, mode_label(mode))
                }
            };
        }

        match self.viewer.display_mut().take_pending_scroll() {
            Some(offset) => scrollable::scroll_to(
                pages_id(),
                scrollable::AbsoluteOffset {
                    x: 0.0,
                    y: offset as f32,
                },
            ),
            None => Task::none(),
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            keyboard::on_key_press(|key, modifiers| Some(Message::KeyPressed(key, modifiers))),
            window::resize_events().map(|(_id, size)| Message::WindowResized(size)),
        ])
    }

    fn view(&self) -> Element<'_, Message> {
        let has_document = self.viewer.has_document();
        let current_page = self.viewer.current_page();
        let page_count = self.viewer.page_count();

        let toolbar = row![
            button("◀").on_press_maybe(
                (has_document && current_page > 0).then_some(Message::PreviousPage)
            ),
            text(if has_document {
                format!("Page {} of {}", current_page + 1, page_count)
            } else {
                "No document".to_string()
            }),
            button("▶").on_press_maybe(
                (has_document && current_page + 1 < page_count).then_some(Message::NextPage)
            ),
            horizontal_space(),
            button("−").on_press(Message::ZoomOut),
            text(format!("{}%", (self.viewer.zoom() * 100.0).round() as i32)),
            button("+").on_press(Message::ZoomIn),
            button("Reset").on_press(Message::ZoomReset),
            button("Fit width").on_press(Message::FitWidth),
            button("Fit page").on_press(Message::FitPage),
        ]
        .spacing(10)
        .padding(10);

        let status = container(text(&self.status).size(14)).padding([4, 10]);

        column![toolbar, self.pages_view(), status].into()
    }

    fn pages_view(&self) -> Element<'_, Message> {
        if !self.viewer.has_document() {
            return container(text("Pass a PDF path on the command line to view it"))
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into();
        }

        let config = self.viewer.config();
        let pages = self.viewer.page_manager().slots().iter().fold(
            Column::new()
                .spacing(config.page_spacing as f32)
                .padding(config.page_margin as f32),
            |pages, slot| {
                let page: Element<'_, Message> =
                    match (slot.geometry(), self.images.get(slot.page_index())) {
                        (Some(geometry), Some(handle)) if slot.is_rendered() => img(handle.clone())
                            .width(Length::Fixed(geometry.width as f32))
                            .height(Length::Fixed(geometry.height as f32))
                            .into(),
                        _ => {
                            let reserved = slot.layout();
                            Space::new(
                                Length::Fixed(reserved.width as f32),
                                Length::Fixed(reserved.height as f32),
                            )
                            .into()
                        }
                    };
                pages.push(page)
            },
        );

        scrollable(pages)
            .id(pages_id())
            .direction(scrollable::Direction::Both {
                vertical: scrollable::Scrollbar::default(),
                horizontal: scrollable::Scrollbar::default(),
            })
            .on_scroll(Message::Scrolled)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

fn pages_id() -> scrollable::Id {
    scrollable::Id::new("pages")
}

fn mode_label(mode: ZoomMode) -> &'static str {
    match mode {
        ZoomMode::Free => "free",
        ZoomMode::FitWidth => "fit width",
        ZoomMode::FitPage => "fit page",
    }
}

fn map_key(key: &keyboard::Key) -> Option<Key> {
    use keyboard::key::Named;

    let key = match key {
        keyboard::Key::Named(Named::ArrowLeft) => Key::ArrowLeft,
        keyboard::Key::Named(Named::ArrowRight) => Key::ArrowRight,
        keyboard::Key::Named(Named::ArrowUp) => Key::ArrowUp,
        keyboard::Key::Named(Named::ArrowDown) => Key::ArrowDown,
        keyboard::Key::Named(Named::PageUp) => Key::PageUp,
        keyboard::Key::Named(Named::PageDown) => Key::PageDown,
        keyboard::Key::Named(Named::Home) => Key::Home,
        keyboard::Key::Named(Named::End) => Key::End,
        keyboard::Key::Character(c) => Key::Character(c.chars().next()?),
        _ => return None,
    };
    Some(key)
}

fn map_modifiers(modifiers: keyboard::Modifiers) -> Modifiers {
    Modifiers {
        control: modifiers.control() || modifiers.command(),
        shift: modifiers.shift(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn named_keys_map_to_navigation_keys() {
        use keyboard::key::Named;

        assert_eq!(
            map_key(&keyboard::Key::Named(Named::PageDown)),
            Some(Key::PageDown)
        );
        assert_eq!(map_key(&keyboard::Key::Named(Named::Home)), Some(Key::Home));
        assert_eq!(map_key(&keyboard::Key::Named(Named::Escape)), None);
    }

    #[test]
    fn characters_keep_their_first_char() {
        assert_eq!(
            map_key(&keyboard::Key::Character("=".into())),
            Some(Key::Character('='))
        );
    }

    #[test]
    fn command_counts_as_control() {
        let mapped = map_modifiers(keyboard::Modifiers::COMMAND);
        assert!(mapped.control);
        assert!(!mapped.shift);
    }
}
