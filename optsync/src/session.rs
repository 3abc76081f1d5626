//! Settings panel workflow.
//!
//! A [`SettingsSession`] ties a [`Reconciler`] to a [`ConfigStore`] and an
//! optional live preview. The host drives it from its UI events: form edits
//! call [`SettingsSession::update`], preview edits call
//! [`SettingsSession::update_from_preview`], and the save / restore buttons
//! call [`SettingsSession::commit`] and [`SettingsSession::restore_defaults`].

use log::{debug, info, warn};

use crate::{
    data::{ConfigTree, DescriptorList, Scalar},
    error::{ReconcileError, SessionError},
    reconciler::Reconciler,
    store::{ConfigDocument, ConfigStore, StoreKey},
};

/// A text-editing surface that shows the serialized settings and lets the
/// user edit them directly.
pub trait PreviewSurface {
    /// Replace the displayed text.
    fn set_text(&mut self, text: &str);

    /// Current text, including unsaved user edits.
    fn text(&self) -> String;

    /// Apply the settings to the surface itself.
    fn apply_options(&mut self, options: &ConfigTree);

    /// Switch the host theme.
    fn set_theme(&mut self, _theme: Option<&str>) {}
}

/// How the last [`SettingsSession::reload`] seeded the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The stored config was loaded.
    Loaded,
    /// Nothing is stored under the key; defaults are in effect.
    NotFound,
    /// A document exists or may exist but could not be read or used.
    /// Defaults are in effect, and committing replaces the stored document.
    Unusable(String),
}

impl LoadOutcome {
    pub fn is_unusable(&self) -> bool {
        matches!(self, LoadOutcome::Unusable(_))
    }
}

/// One editing session over a stored settings document.
pub struct SettingsSession<S> {
    store: S,
    key: StoreKey,
    reconciler: Reconciler,
    preview: Option<Box<dyn PreviewSurface>>,
    outcome: LoadOutcome,
}

impl<S: ConfigStore> SettingsSession<S> {
    /// Open a session with a default reconciler over `descriptors`.
    pub async fn open(store: S, key: StoreKey, descriptors: DescriptorList) -> Self {
        Self::open_with(store, key, Reconciler::new(descriptors)).await
    }

    /// Open a session with a preconfigured reconciler.
    ///
    /// The stored document seeds the reconciler. When nothing is stored,
    /// the fetch fails, or the stored config is unusable, the session starts
    /// from defaults; [`SettingsSession::load_outcome`] tells these apart.
    pub async fn open_with(store: S, key: StoreKey, reconciler: Reconciler) -> Self {
        let mut session = Self {
            store,
            key,
            reconciler,
            preview: None,
            outcome: LoadOutcome::NotFound,
        };
        session.reload().await;
        session
    }

    /// Re-read the stored document, discarding unsaved edits.
    pub async fn reload(&mut self) -> &LoadOutcome {
        let outcome = match self.store.fetch(&self.key).await {
            Ok(Some(document)) => match ConfigDocument::config_of(&document) {
                Some(config) => match self.reconciler.load_from_tree(config) {
                    Ok(()) => {
                        info!("loaded settings from {}", self.key);
                        LoadOutcome::Loaded
                    }
                    Err(e) => LoadOutcome::Unusable(e.to_string()),
                },
                None => LoadOutcome::Unusable("document has no config".to_string()),
            },
            Ok(None) => {
                debug!("no settings stored at {}, using defaults", self.key);
                LoadOutcome::NotFound
            }
            Err(e) => LoadOutcome::Unusable(e.to_string()),
        };
        if let LoadOutcome::Unusable(reason) = &outcome {
            warn!("stored settings at {} are unusable, using defaults: {reason}", self.key);
        }
        if outcome != LoadOutcome::Loaded {
            self.reconciler.reset_to_defaults();
        }
        self.outcome = outcome;
        self.push_preview();
        &self.outcome
    }

    /// How the stored document seeded this session.
    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.outcome
    }

    /// Attach the live preview once its widget is ready.
    ///
    /// The surface immediately receives the current text, options and theme.
    /// Edits made before attachment are not lost; they live in the
    /// reconciler.
    pub fn attach_preview(&mut self, surface: Box<dyn PreviewSurface>) {
        self.preview = Some(surface);
        self.push_preview();
    }

    pub fn detach_preview(&mut self) -> Option<Box<dyn PreviewSurface>> {
        self.preview.take()
    }

    /// Apply a form edit. `None` clears the attribute back to its default.
    pub fn update(&mut self, path: &str, value: Option<Scalar>) -> Result<(), ReconcileError> {
        info!(
            "settings update item={path}, value={}",
            value.as_ref().map_or("<unset>".to_string(), ToString::to_string)
        );
        self.reconciler.set_value(path, value)?;
        self.push_preview();
        Ok(())
    }

    /// Pull edits made directly in the preview text.
    ///
    /// On malformed or badly shaped text the previous settings stay in
    /// effect and the error is returned for the host to report.
    pub fn update_from_preview(&mut self) -> Result<(), ReconcileError> {
        let Some(preview) = &self.preview else {
            return Ok(());
        };
        let text = preview.text();
        if text == self.reconciler.serialize() {
            return Ok(());
        }
        self.load_text(&text)
    }

    /// Replace the settings with parsed JSON text, e.g. an imported file.
    ///
    /// On failure the previous settings stay in effect.
    pub fn load_text(&mut self, text: &str) -> Result<(), ReconcileError> {
        match self.reconciler.load_from_text(text) {
            Ok(()) => {
                self.push_preview();
                Ok(())
            }
            Err(e) => {
                warn!("could not use JSON text for config, falling back to menu config: {e}");
                Err(e)
            }
        }
    }

    /// Store the current settings and return them for the host to apply.
    ///
    /// Pending preview edits are pulled first; if they do not parse, the
    /// last good settings are stored instead.
    pub async fn commit(&mut self) -> Result<ConfigTree, SessionError> {
        // Already logged by update_from_preview.
        let _ = self.update_from_preview();
        let document = ConfigDocument::new(self.reconciler.tree().clone());
        self.store.store(&self.key, &document).await?;
        debug!("settings stored at {}", self.key);
        Ok(document.config)
    }

    /// Delete the stored document and return to defaults.
    pub async fn restore_defaults(&mut self) -> Result<(), SessionError> {
        self.store.delete(&self.key).await?;
        self.outcome = LoadOutcome::NotFound;
        info!("restored editor defaults by removing {}", self.key);
        self.reconciler.reset_to_defaults();
        self.push_preview();
        Ok(())
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn key(&self) -> &StoreKey {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn push_preview(&mut self) {
        if let Some(preview) = self.preview.as_mut() {
            preview.apply_options(self.reconciler.tree());
            preview.set_text(self.reconciler.serialize());
            preview.set_theme(self.reconciler.theme());
        }
    }
}
