// ============================================================================
// WIDGET STATUS - Estado visible del widget con notificación a subscribers
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

type Subscriber = Box<dyn Fn(&WidgetView)>;

/// Lo que el widget muestra alrededor del mapa
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetView {
    /// Sin origen de datos configurado
    Idle,
    /// Primera consulta en curso
    Loading,
    /// Consulta correcta sin registros válidos
    Empty,
    Rendered { markers: usize },
    /// Solo se muestra si no hay datos previos en pantalla
    FetchError(String),
    /// El mapa no pudo construirse; aislado a este widget
    RenderError(String),
}

impl WidgetView {
    pub fn is_error(&self) -> bool {
        matches!(self, WidgetView::FetchError(_) | WidgetView::RenderError(_))
    }
}

/// Estado compartido (clonable) con subscribers
#[derive(Clone)]
pub struct WidgetStatus {
    value: Rc<RefCell<WidgetView>>,
    subscribers: Rc<RefCell<Vec<Subscriber>>>,
}

impl WidgetStatus {
    pub fn new() -> Self {
        Self {
            value: Rc::new(RefCell::new(WidgetView::Idle)),
            subscribers: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn get(&self) -> WidgetView {
        self.value.borrow().clone()
    }

    /// Cambia el estado y notifica solo si es distinto
    pub fn set(&self, view: WidgetView) {
        if *self.value.borrow() == view {
            return;
        }
        *self.value.borrow_mut() = view.clone();
        for subscriber in self.subscribers.borrow().iter() {
            subscriber(&view);
        }
    }

    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&WidgetView) + 'static,
    {
        self.subscribers.borrow_mut().push(Box::new(callback));
    }

    pub fn clear_subscribers(&self) {
        self.subscribers.borrow_mut().clear();
    }
}

impl Default for WidgetStatus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_notifies_only_on_change() {
        let status = WidgetStatus::new();
        let hits = Rc::new(Cell::new(0));
        {
            let hits = hits.clone();
            status.subscribe(move |_| hits.set(hits.get() + 1));
        }

        status.set(WidgetView::Loading);
        status.set(WidgetView::Loading);
        status.set(WidgetView::Rendered { markers: 2 });

        assert_eq!(hits.get(), 2);
        assert_eq!(status.clone().get(), WidgetView::Rendered { markers: 2 });
    }

    #[test]
    fn test_error_views() {
        assert!(WidgetView::FetchError("x".to_string()).is_error());
        assert!(WidgetView::RenderError("x".to_string()).is_error());
        assert!(!WidgetView::Empty.is_error());
    }
}
