//! Contract checks shared by every backend's tests

use bytes::Bytes;

use crate::backend::StorageService;
use crate::error::{StorageError, StorageResult};
use crate::location::Location;
use crate::object::stream_from_bytes;

pub async fn check_all(storage: &dyn StorageService) {
    check_round_trip(storage).await;
    check_empty_and_binary(storage).await;
    check_overwrite(storage).await;
    check_not_found(storage).await;
    check_delete_is_idempotent(storage).await;
    check_leading_slash(storage).await;
    check_report_scenario(storage).await;
}

async fn read(storage: &dyn StorageService, location: &Location) -> Bytes {
    storage
        .get_file(location)
        .await
        .unwrap()
        .to_bytes()
        .await
        .unwrap()
}

fn assert_not_found<T: std::fmt::Debug>(result: StorageResult<T>, location: &Location) {
    match result {
        Err(StorageError::NotFound(missing)) => assert_eq!(&missing, location),
        other => panic!("expected NotFound for {}, got {:?}", location, other),
    }
}

async fn check_round_trip(storage: &dyn StorageService) {
    let location = Location::new("round/trip.txt");
    storage
        .put_stream(&location, stream_from_bytes("hello world"))
        .await
        .unwrap();

    assert!(storage.exists(&location).await.unwrap());
    assert_eq!(read(storage, &location).await.as_ref(), b"hello world");
}

async fn check_empty_and_binary(storage: &dyn StorageService) {
    let empty = Location::new("edge/empty");
    storage.put_bytes(&empty, Bytes::new()).await.unwrap();
    assert!(storage.exists(&empty).await.unwrap());
    assert!(read(storage, &empty).await.is_empty());

    let binary = Location::new("edge/binary.bin");
    let data: Vec<u8> = (0..4096u32).map(|i| (i * 31 % 256) as u8).collect();
    let chunks: Vec<StorageResult<Bytes>> = data
        .chunks(1000)
        .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
        .collect();
    storage
        .put_stream(&binary, Box::pin(futures::stream::iter(chunks)))
        .await
        .unwrap();
    assert_eq!(read(storage, &binary).await.as_ref(), data.as_slice());
}

async fn check_overwrite(storage: &dyn StorageService) {
    let location = Location::new("overwrite/file.txt");
    storage
        .put_bytes(&location, Bytes::from_static(b"first version, longer"))
        .await
        .unwrap();
    storage
        .put_bytes(&location, Bytes::from_static(b"second"))
        .await
        .unwrap();

    assert_eq!(read(storage, &location).await.as_ref(), b"second");
}

async fn check_not_found(storage: &dyn StorageService) {
    let location = Location::new("never/written.txt");
    assert!(!storage.exists(&location).await.unwrap());
    assert_not_found(storage.get_file(&location).await, &location);
}

async fn check_delete_is_idempotent(storage: &dyn StorageService) {
    let location = Location::new("delete/me.txt");
    storage.delete_file(&location).await.unwrap();

    storage
        .put_bytes(&location, Bytes::from_static(b"bye"))
        .await
        .unwrap();
    storage.delete_file(&location).await.unwrap();
    storage.delete_file(&location).await.unwrap();

    assert!(!storage.exists(&location).await.unwrap());
    assert_not_found(storage.get_file(&location).await, &location);
}

async fn check_leading_slash(storage: &dyn StorageService) {
    storage
        .put_bytes(&Location::new("/slash/file.txt"), Bytes::from_static(b"same"))
        .await
        .unwrap();

    let plain = Location::new("slash/file.txt");
    assert!(storage.exists(&plain).await.unwrap());
    assert_eq!(read(storage, &plain).await.as_ref(), b"same");
}

async fn check_report_scenario(storage: &dyn StorageService) {
    let location = Location::from_parts(["reports", "2024", "jan.csv"]);
    storage
        .put_stream(
            &Location::new("reports/2024/jan.csv"),
            stream_from_bytes("x,y\n1,2\n"),
        )
        .await
        .unwrap();

    assert!(storage.exists(&location).await.unwrap());
    let content = read(storage, &location).await;
    assert_eq!(std::str::from_utf8(&content).unwrap(), "x,y\n1,2\n");

    storage.delete_file(&location).await.unwrap();
    assert!(!storage.exists(&location).await.unwrap());
    assert_not_found(storage.get_file(&location).await, &location);
}
