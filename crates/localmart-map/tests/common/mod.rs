//! In-memory gateway with scripted answers for map tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use localmart_core::{
    BackendGateway, Coordinate, GatewayError, LocationError, LocationEvent, NearbyQuery,
    RawNearbyRecord,
};
use tokio::sync::{broadcast, Notify};

type Answer = Result<Vec<RawNearbyRecord>, GatewayError>;

pub struct FakeGateway {
    products: Mutex<Answer>,
    workshops: Mutex<Answer>,
    position: Mutex<Result<Coordinate, LocationError>>,
    position_delay: Option<Duration>,
    /// When set, nearby reads signal `fetch_started` and then never finish.
    hold_fetches: bool,
    pub fetch_started: Arc<Notify>,
    pub product_calls: AtomicUsize,
    pub workshop_calls: AtomicUsize,
    pub queries: Mutex<Vec<NearbyQuery>>,
    events: Option<broadcast::Sender<LocationEvent>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self {
            products: Mutex::new(Ok(Vec::new())),
            workshops: Mutex::new(Ok(Vec::new())),
            position: Mutex::new(Err(LocationError::PermissionDenied)),
            position_delay: None,
            hold_fetches: false,
            fetch_started: Arc::new(Notify::new()),
            product_calls: AtomicUsize::new(0),
            workshop_calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
            events: None,
        }
    }

    pub fn with_position(self, coordinate: Coordinate) -> Self {
        *self.position.lock().unwrap() = Ok(coordinate);
        self
    }

    pub fn with_position_error(self, error: LocationError) -> Self {
        *self.position.lock().unwrap() = Err(error);
        self
    }

    pub fn with_position_delay(mut self, delay: Duration) -> Self {
        self.position_delay = Some(delay);
        self
    }

    pub fn with_products(self, rows: Vec<serde_json::Value>) -> Self {
        *self.products.lock().unwrap() = Ok(parse_rows(rows));
        self
    }

    pub fn with_workshops(self, rows: Vec<serde_json::Value>) -> Self {
        *self.workshops.lock().unwrap() = Ok(parse_rows(rows));
        self
    }

    pub fn failing_products(self) -> Self {
        *self.products.lock().unwrap() = Err(remote_error("get_nearby_products"));
        self
    }

    pub fn failing_workshops(self) -> Self {
        *self.workshops.lock().unwrap() = Err(remote_error("get_nearby_workshops"));
        self
    }

    pub fn holding_fetches(mut self) -> Self {
        self.hold_fetches = true;
        self
    }

    pub fn with_location_events(mut self) -> Self {
        let (tx, _) = broadcast::channel(16);
        self.events = Some(tx);
        self
    }

    /// Number of currently registered location listeners.
    pub fn listener_count(&self) -> usize {
        self.events.as_ref().map_or(0, broadcast::Sender::receiver_count)
    }

    pub fn move_to(&self, coordinate: Coordinate) {
        if let Some(tx) = &self.events {
            let _ = tx.send(LocationEvent::Found(coordinate));
        }
    }

    pub fn set_products(&self, rows: Vec<serde_json::Value>) {
        *self.products.lock().unwrap() = Ok(parse_rows(rows));
    }

    async fn answer(&self, slot: &Mutex<Answer>, query: NearbyQuery) -> Answer {
        self.queries.lock().unwrap().push(query);
        if self.hold_fetches {
            self.fetch_started.notify_one();
            std::future::pending::<()>().await;
        }
        slot.lock().unwrap().clone()
    }
}

#[async_trait]
impl BackendGateway for FakeGateway {
    async fn nearby_products(&self, query: NearbyQuery) -> Answer {
        self.product_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(&self.products, query).await
    }

    async fn nearby_workshops(&self, query: NearbyQuery) -> Answer {
        self.workshop_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(&self.workshops, query).await
    }

    async fn current_position(&self, _max_zoom: u8) -> Result<Coordinate, LocationError> {
        if let Some(delay) = self.position_delay {
            tokio::time::sleep(delay).await;
        }
        self.position.lock().unwrap().clone()
    }

    fn location_events(&self) -> Option<broadcast::Receiver<LocationEvent>> {
        self.events.as_ref().map(broadcast::Sender::subscribe)
    }
}

pub fn coord(lat: f64, lng: f64) -> Coordinate {
    Coordinate::new(lat, lng).unwrap()
}

fn parse_rows(rows: Vec<serde_json::Value>) -> Vec<RawNearbyRecord> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).unwrap())
        .collect()
}

fn remote_error(procedure: &str) -> GatewayError {
    GatewayError::Remote {
        procedure: procedure.to_owned(),
        status: 500,
        message: "internal error".to_owned(),
    }
}
