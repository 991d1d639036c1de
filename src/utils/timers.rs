// ============================================================================
// TIMERS - Intervalos y tareas async de un solo hilo
// ============================================================================
// En el navegador: gloo_timers::Interval + wasm_bindgen_futures::spawn_local.
// Soltar el IntervalHandle cancela el intervalo (igual que gloo).
// ============================================================================

use std::any::Any;
use std::future::Future;
use std::pin::Pin;

/// Future local (sin `Send`): todo corre en el hilo de la UI
pub type LocalFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Handle opaco de un intervalo activo; el `Drop` lo cancela
pub type IntervalHandle = Box<dyn Any>;

pub trait Scheduler {
    /// Instala un intervalo periódico
    fn set_interval(&self, period_ms: u32, tick: Box<dyn FnMut()>) -> IntervalHandle;

    /// Lanza una tarea en el hilo actual
    fn spawn(&self, task: LocalFuture<'static, ()>);
}

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserScheduler;

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::*;
    use gloo_timers::callback::Interval;

    #[derive(Clone, Copy, Default)]
    pub struct BrowserScheduler;

    impl Scheduler for BrowserScheduler {
        fn set_interval(&self, period_ms: u32, mut tick: Box<dyn FnMut()>) -> IntervalHandle {
            Box::new(Interval::new(period_ms, move || tick()))
        }

        fn spawn(&self, task: LocalFuture<'static, ()>) {
            wasm_bindgen_futures::spawn_local(task);
        }
    }
}
