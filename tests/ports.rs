use procmesh::channels::{ChannelEndpoint, ChannelError, FlumeEndpoint};
use procmesh::process::{Port, PortRead};
use procmesh::tensor::Tensor;
use procmesh::types::{DType, PortDirection, Shape};

mod common;
use common::*;

/********************
 * Send / receive
 ********************/

#[tokio::test]
async fn test_output_send_reaches_endpoint() {
    let endpoint = started_loopback("a_out", [1], 4);
    let mut port = Port::output("a_out", [1], DType::Float64);
    port.bind(as_endpoint(&endpoint));

    port.send(&Tensor::scalar(7.0)).await.unwrap();

    let frame = endpoint.recv().await.unwrap();
    assert_eq!(frame.as_scalar(), Some(7.0));
}

#[tokio::test]
async fn test_input_recv_from_endpoint() {
    let endpoint = started_loopback("s_in", [1], 4);
    let mut port = Port::input("s_in", [1], DType::Float64);
    port.bind(as_endpoint(&endpoint));

    endpoint.send(Tensor::scalar(3.0)).await.unwrap();

    assert_eq!(port.recv().await.unwrap(), PortRead::Frame(Tensor::scalar(3.0)));
}

/********************
 * Dangling ports
 ********************/

#[tokio::test]
async fn test_dangling_output_send_is_noop() {
    let port = Port::output("a_out", [1], DType::Float64);
    assert!(port.is_dangling());
    port.send(&Tensor::scalar(1.0)).await.unwrap();
}

#[tokio::test]
async fn test_dangling_input_yields_no_data() {
    let port = Port::input("s_in", [1], DType::Float64);
    assert!(port.is_dangling());
    assert_eq!(port.recv().await.unwrap(), PortRead::Dangling);
}

/**************************
 * Reduce across producers
 **************************/

#[tokio::test]
async fn test_two_producers_sum_into_one_input() {
    let first = started_loopback("s_in", [2], 4);
    let second = started_loopback("s_in", [2], 4);
    let mut port = Port::input("s_in", [2], DType::Float64);
    port.bind(as_endpoint(&first));
    port.bind(as_endpoint(&second));

    let a = Tensor::from_vec(Shape::from([2]), vec![1.0, 2.0]).unwrap();
    let b = Tensor::from_vec(Shape::from([2]), vec![10.0, 20.0]).unwrap();

    first.send(a.clone()).await.unwrap();
    second.send(b.clone()).await.unwrap();
    let forward = port.recv().await.unwrap();

    // Same frames in the opposite arrival order.
    second.send(b).await.unwrap();
    first.send(a).await.unwrap();
    let reversed = port.recv().await.unwrap();

    let expected = Tensor::from_vec(Shape::from([2]), vec![11.0, 22.0]).unwrap();
    assert_eq!(forward, PortRead::Frame(expected.clone()));
    assert_eq!(reversed, PortRead::Frame(expected));
}

#[tokio::test]
async fn test_reduce_shape_mismatch_is_an_error() {
    let first = started_loopback("s_in", [2], 4);
    let second = started_loopback("s_in", [2], 4);
    let mut port = Port::input("s_in", [2], DType::Float64);
    port.bind(as_endpoint(&first));
    port.bind(as_endpoint(&second));

    first.send(Tensor::scalar(1.0)).await.unwrap();
    second
        .send(Tensor::from_vec(Shape::from([2]), vec![1.0, 2.0]).unwrap())
        .await
        .unwrap();

    let err = port.recv().await.unwrap_err();
    assert!(matches!(err, ChannelError::Reduce { .. }));
}

/********************
 * Lifecycle
 ********************/

#[tokio::test]
async fn test_endpoint_must_be_started() {
    let endpoint = FlumeEndpoint::loopback("a_out", Shape::scalar(), DType::Float64, 4);
    let err = endpoint.send(Tensor::scalar(1.0)).await.unwrap_err();
    assert!(matches!(err, ChannelError::NotStarted { .. }));
}

#[tokio::test]
async fn test_stop_drains_then_closes() {
    let endpoint = started_loopback("s_in", [1], 4);
    let mut port = Port::input("s_in", [1], DType::Float64);
    port.bind(as_endpoint(&endpoint));

    endpoint.send(Tensor::scalar(1.0)).await.unwrap();
    endpoint.send(Tensor::scalar(2.0)).await.unwrap();
    endpoint.stop();

    // Buffered frames drain before end of stream is reported.
    assert_eq!(port.recv().await.unwrap(), PortRead::Frame(Tensor::scalar(1.0)));
    assert_eq!(port.recv().await.unwrap(), PortRead::Frame(Tensor::scalar(2.0)));
    assert_eq!(port.recv().await.unwrap(), PortRead::Closed);

    // Sends after stop observe the graceful closure, not an error state.
    let err = endpoint.send(Tensor::scalar(3.0)).await.unwrap_err();
    assert!(matches!(err, ChannelError::Closed { .. }));
}

#[tokio::test]
async fn test_stop_unblocks_a_pending_recv() {
    let endpoint = started_loopback("s_in", [1], 4);
    let waiter = {
        let endpoint = as_endpoint(&endpoint);
        tokio::spawn(async move { endpoint.recv().await })
    };
    // Give the receiver a chance to park before stopping.
    tokio::task::yield_now().await;
    endpoint.stop();

    let result = waiter.await.unwrap();
    assert!(matches!(result, Err(ChannelError::Closed { .. })));
}

#[tokio::test]
async fn test_peer_vanishing_is_abnormal() {
    let (a, b) = FlumeEndpoint::pair("a_out", "s_in", Shape::scalar(), DType::Float64, 4);
    a.start();
    b.start();

    drop(a);

    let err = b.recv().await.unwrap_err();
    assert!(matches!(err, ChannelError::Disconnected { .. }));
}

#[tokio::test]
async fn test_pair_delivers_across_ends() {
    let (a, b) = FlumeEndpoint::pair("a_out", "s_in", Shape::scalar(), DType::Float64, 4);
    a.start();
    b.start();

    a.send(Tensor::scalar(5.0)).await.unwrap();
    assert_eq!(b.recv().await.unwrap().as_scalar(), Some(5.0));

    b.send(Tensor::scalar(6.0)).await.unwrap();
    assert_eq!(a.recv().await.unwrap().as_scalar(), Some(6.0));
}

/********************
 * Direction misuse
 ********************/

#[tokio::test]
async fn test_direction_misuse_is_rejected() {
    let input = Port::input("s_in", [1], DType::Float64);
    let err = input.send(&Tensor::scalar(1.0)).await.unwrap_err();
    assert!(matches!(
        err,
        ChannelError::Direction { expected: PortDirection::Output, .. }
    ));

    let output = Port::output("a_out", [1], DType::Float64);
    let err = output.recv().await.unwrap_err();
    assert!(matches!(
        err,
        ChannelError::Direction { expected: PortDirection::Input, .. }
    ));
}
