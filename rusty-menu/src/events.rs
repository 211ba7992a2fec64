use std::sync::{PoisonError, RwLock};

use crate::{error::MenuError, page::MenuPage};

/// Emitted before a page change takes effect. Observers cannot veto it.
#[derive(Debug)]
pub struct PageChanging<'a, D = ()> {
    pub old_index: usize,
    pub old_page: &'a MenuPage<D>,
    pub new_index: usize,
    pub new_page: &'a MenuPage<D>,
}

/// Emitted once the new page's content is on screen.
#[derive(Debug)]
pub struct PageChanged<'a, D = ()> {
    pub index: usize,
    pub page: &'a MenuPage<D>,
}

type ChangingObserver<D> = Box<dyn Fn(&PageChanging<'_, D>) + Send + Sync>;
type ChangedObserver<D> = Box<dyn Fn(&PageChanged<'_, D>) + Send + Sync>;
type ErrorObserver = Box<dyn Fn(&MenuError) + Send + Sync>;

/// Registered observers of one menu.
///
/// Observers run synchronously on the task performing the transition and
/// must not register further observers from inside the callback.
pub(crate) struct Observers<D> {
    changing: RwLock<Vec<ChangingObserver<D>>>,
    changed: RwLock<Vec<ChangedObserver<D>>>,
    errors: RwLock<Vec<ErrorObserver>>,
}

impl<D> Observers<D> {
    pub(crate) fn new() -> Self {
        Self {
            changing: RwLock::new(Vec::new()),
            changed: RwLock::new(Vec::new()),
            errors: RwLock::new(Vec::new()),
        }
    }

    pub(crate) fn add_changing(&self, observer: ChangingObserver<D>) {
        self.changing
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    pub(crate) fn add_changed(&self, observer: ChangedObserver<D>) {
        self.changed
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    pub(crate) fn add_error(&self, observer: ErrorObserver) {
        self.errors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    pub(crate) fn page_changing(&self, event: &PageChanging<'_, D>) {
        let observers = self.changing.read().unwrap_or_else(PoisonError::into_inner);
        for observer in observers.iter() {
            observer(event);
        }
    }

    pub(crate) fn page_changed(&self, event: &PageChanged<'_, D>) {
        let observers = self.changed.read().unwrap_or_else(PoisonError::into_inner);
        for observer in observers.iter() {
            observer(event);
        }
    }

    pub(crate) fn error(&self, error: &MenuError) {
        let observers = self.errors.read().unwrap_or_else(PoisonError::into_inner);
        for observer in observers.iter() {
            observer(error);
        }
    }
}
