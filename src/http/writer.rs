use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::{Response, ResponseHeader};

/// Writes a response head and body as two flushed groups.
pub struct ResponseWriter<'a> {
    header: &'a ResponseHeader,
    body: &'a [u8],
}

impl<'a> ResponseWriter<'a> {
    pub fn new(response: &'a Response) -> Self {
        Self {
            header: &response.header,
            body: &response.body,
        }
    }

    pub async fn write_to_stream<W>(&self, stream: &mut W) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        write_header(stream, self.header).await?;

        stream.write_all(self.body).await?;
        stream.flush().await?;

        Ok(())
    }
}

/// Writes only the head. Used on its own for the streaming route, whose body
/// is produced by the broadcaster.
pub async fn write_header<W>(stream: &mut W, header: &ResponseHeader) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    stream.write_all(header.serialize().as_bytes()).await?;
    stream.flush().await
}
