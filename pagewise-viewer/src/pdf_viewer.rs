use iced::widget::image::Handle;
use pagewise_core::PageManager;
use std::collections::HashMap;

/// Widget handles for rendered pages, rebuilt only when a page's render changes.
#[derive(Debug, Default)]
pub struct PageImages {
    handles: HashMap<usize, (u32, Handle)>, // page_index -> (render dpi, handle)
}

impl PageImages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, page_index: usize) -> Option<&Handle> {
        self.handles.get(&page_index).map(|(_, handle)| handle)
    }

    /// Bring the handles in line with the page manager's slots.
    ///
    /// Returns how many handles were created.
    pub fn sync(&mut self, pages: &PageManager) -> usize {
        self.handles
            .retain(|&index, _| pages.page_at(index).is_some_and(|slot| slot.is_rendered()));

        let mut created = 0;
        for slot in pages.slots() {
            let (Some(dpi), Some(image)) = (slot.last_rendered_dpi(), slot.image()) else {
                continue;
            };
            let index = slot.page_index();
            if self
                .handles
                .get(&index)
                .is_some_and(|(cached_dpi, _)| *cached_dpi == dpi)
            {
                continue;
            }

            let handle = Handle::from_rgba(image.width(), image.height(), image.as_raw().clone());
            self.handles.insert(index, (dpi, handle));
            created += 1;
        }

        if created > 0 {
            tracing::trace!("Created {} page handles ({} cached)", created, self.handles.len());
        }
        created
    }

    pub fn clear(&mut self) {
        self.handles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagewise_core::testing::FakeDocument;
    use pagewise_core::ViewerConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn handles_follow_rendered_slots() {
        let document = FakeDocument::uniform(3, 50.0, 60.0);
        let mut pages = PageManager::new(&ViewerConfig::default());
        pages.build(&document);
        let mut images = PageImages::new();

        pages.pre_render_initial(&document, 2, 72);
        assert_eq!(images.sync(&pages), 2);
        assert_eq!(images.sync(&pages), 0);
        assert!(images.get(0).is_some());
        assert!(images.get(2).is_none());

        pages.render_at(&document, 0, 144);
        assert_eq!(images.sync(&pages), 1);

        pages.clear();
        assert_eq!(images.sync(&pages), 0);
        assert!(images.get(0).is_none());
        assert!(images.get(1).is_none());
    }
}
