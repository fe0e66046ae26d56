use std::io::Read;
use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};

use crate::backend::{ObjectBackend, Retrieval};
use crate::glacier::GlacierBackend;
use crate::inventory::MemoryInventory;
use crate::mirror::InventoryMirror;
use crate::testutil::{FakeGlacier, MemoryBackend};

/// Glacier backend over fakes, with handles kept for inspection.
pub struct GlacierFixture {
    pub cold: Arc<FakeGlacier>,
    pub warm: Arc<MemoryBackend>,
    pub inventory: Arc<MemoryInventory>,
    pub backend: GlacierBackend,
}

pub fn glacier_fixture() -> GlacierFixture {
    let cold = Arc::new(FakeGlacier::new());
    let warm = Arc::new(MemoryBackend::new());
    let inventory = Arc::new(MemoryInventory::new());
    let backend = GlacierBackend::new(
        Box::new(cold.clone()),
        Box::new(inventory.clone()),
        InventoryMirror::new(Box::new(warm.clone())),
    );
    GlacierFixture {
        cold,
        warm,
        inventory,
        backend,
    }
}

pub fn object_backend() -> (Arc<MemoryBackend>, ObjectBackend) {
    let store = Arc::new(MemoryBackend::new());
    let backend = ObjectBackend::new(Box::new(store.clone()));
    (store, backend)
}

pub fn ready_bytes(retrieval: Retrieval) -> Vec<u8> {
    match retrieval {
        Retrieval::Ready(mut cursor) => {
            let mut out = Vec::new();
            cursor.read_to_end(&mut out).unwrap();
            out
        }
        other => panic!("expected Ready, got {other:?}"),
    }
}

pub fn local_time(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}
