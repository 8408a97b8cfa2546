use crate::validate::HOSTING_DOMAIN;

use super::picker::BRANCH_PREFIX;

/// The two static dialogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    Help,
    About,
}

/// Where a click inside an open dialog landed.
#[allow(dead_code)] // Raised by embedding front ends; the CLI only opens dialogs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Click {
    /// The dimmed overlay around the panel.
    Backdrop(Modal),
    /// Anything inside the panel itself.
    Content(Modal),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalController {
    help_open: bool,
    about_open: bool,
}

impl ModalController {
    fn slot(&mut self, modal: Modal) -> &mut bool {
        match modal {
            Modal::Help => &mut self.help_open,
            Modal::About => &mut self.about_open,
        }
    }

    pub fn open(&mut self, modal: Modal) {
        *self.slot(modal) = true;
    }

    #[allow(dead_code)]
    pub fn close(&mut self, modal: Modal) {
        *self.slot(modal) = false;
    }

    #[allow(dead_code)]
    pub fn toggle(&mut self, modal: Modal) {
        let slot = self.slot(modal);
        *slot = !*slot;
    }

    pub fn is_open(&self, modal: Modal) -> bool {
        match modal {
            Modal::Help => self.help_open,
            Modal::About => self.about_open,
        }
    }

    /// Backdrop clicks close the dialog they belong to; clicks on the
    /// panel content are ignored.
    #[allow(dead_code)]
    pub fn click(&mut self, click: Click) {
        if let Click::Backdrop(modal) = click {
            self.close(modal);
        }
    }

    /// Fragments of every open dialog, Help first.
    pub fn render_open(&self) -> String {
        [Modal::Help, Modal::About]
            .into_iter()
            .filter(|m| self.is_open(*m))
            .map(render_modal)
            .collect()
    }
}

pub fn render_modal(modal: Modal) -> String {
    let (id, title, body) = match modal {
        Modal::Help => (
            "help-modal",
            "How it works",
            format!(
                "<ol>\
                 <li>Paste a repository URL such as <code>https://{HOSTING_DOMAIN}/owner/repo</code>.</li>\
                 <li>Describe the change in plain language, or start from an example.</li>\
                 <li>Use <strong>Preview</strong> to see sample diffs before anything is written.</li>\
                 <li>Use <strong>Execute</strong> to apply the edits on a new branch \
                 (<code>{BRANCH_PREFIX}…</code> unless you name one) and open a pull request.</li>\
                 </ol>"
            ),
        ),
        Modal::About => (
            "about-modal",
            "About",
            "<p>Edit Console sends natural-language change requests to the repository \
             editor backend, which plans and applies the edits with an AI model and \
             proposes them as a pull request.</p>\
             <p>Review every pull request before merging.</p>"
                .to_string(),
        ),
    };
    format!(
        "<div class=\"modal-backdrop\" id=\"{id}\">\
         <div class=\"modal-panel\" role=\"dialog\" aria-labelledby=\"{id}-title\">\
         <h2 id=\"{id}-title\">{title}</h2>{body}\
         <button type=\"button\" class=\"modal-close\" data-close=\"{id}\">Close</button>\
         </div></div>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modals_toggle_independently() {
        let mut modals = ModalController::default();
        modals.open(Modal::Help);
        assert!(modals.is_open(Modal::Help));
        assert!(!modals.is_open(Modal::About));
        modals.toggle(Modal::About);
        assert!(modals.is_open(Modal::About));
        modals.toggle(Modal::Help);
        assert!(!modals.is_open(Modal::Help));
        assert!(modals.is_open(Modal::About));
    }

    #[test]
    fn test_backdrop_click_closes() {
        let mut modals = ModalController::default();
        modals.open(Modal::About);
        modals.click(Click::Content(Modal::About));
        assert!(modals.is_open(Modal::About));
        modals.click(Click::Backdrop(Modal::About));
        assert!(!modals.is_open(Modal::About));
    }

    #[test]
    fn test_render_open() {
        let mut modals = ModalController::default();
        assert_eq!(modals.render_open(), "");
        modals.open(Modal::Help);
        let html = modals.render_open();
        assert!(html.contains("id=\"help-modal\""));
        assert!(!html.contains("about-modal"));
        assert!(html.contains("https://github.com/owner/repo"));
    }
}
