//! 支付事件消费者
//!
//! 订阅支付服务发布的 `create-payment` 事件，按支付结果推进订单状态：
//! SUCCESS -> DELIVERED，FAILED -> CANCELED，其余一律 PENDING。
//! 映射对未知状态保守：不猜测语义，回退为待定并记录告警。

use std::sync::Arc;

use order_shared::config::KafkaConfig;
use order_shared::error::OrderError;
use order_shared::events::PaymentCreatedEvent;
use order_shared::kafka::{topics, ConsumerMessage, KafkaConsumer};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::models::OrderStatus;
use crate::service::OrderService;

/// 支付状态 -> 订单状态映射
pub fn map_payment_status(payment_status: &str) -> OrderStatus {
    match payment_status {
        "SUCCESS" => OrderStatus::Delivered,
        "FAILED" => OrderStatus::Canceled,
        other => {
            warn!(payment_status = other, "未知的支付状态，订单回退为 PENDING");
            OrderStatus::Pending
        }
    }
}

/// 处理单条支付事件
///
/// orderId 缺失表示支付不关联订单，丢弃且不算错误；
/// 负载无法解析或 orderId 非数字属于格式错误，上抛给消息层处理。
pub async fn handle_payment_event(
    service: &OrderService,
    msg: ConsumerMessage,
) -> Result<(), OrderError> {
    let event: PaymentCreatedEvent = msg.deserialize_payload()?;

    let Some(order_id_raw) = event.order_id.as_deref() else {
        info!(
            payment_id = ?event.payment_id,
            "支付事件未关联订单，已忽略"
        );
        return Ok(());
    };

    let order_id = order_id_raw.parse::<i64>().map_err(|e| {
        OrderError::Kafka(format!("支付事件 orderId 非法 '{order_id_raw}': {e}"))
    })?;

    let status = map_payment_status(&event.status);
    service
        .update_order_status(order_id, status)
        .await
        .map_err(|e| OrderError::Kafka(format!("订单状态更新失败: {e}")))?;

    Ok(())
}

/// 启动支付事件消费循环，直到收到关闭信号
pub async fn run_payment_consumer(
    config: &KafkaConfig,
    service: Arc<OrderService>,
    shutdown: watch::Receiver<bool>,
) -> Result<(), OrderError> {
    let consumer = KafkaConsumer::new(config)?;
    consumer.subscribe(&[topics::PAYMENT_CREATED])?;

    consumer
        .start(shutdown, move |msg| {
            let service = Arc::clone(&service);
            async move { handle_payment_event(&service, msg).await }
        })
        .await;

    Ok(())
}
